//! Shopping cart queries.

use tracing::instrument;

use bookstore_core::{BookId, CartId, CartItemId, Quantity, UserId};

use super::{PgStore, fetch_cart};
use crate::db::{CartRepository, RepositoryError, conflict_on_unique};
use crate::models::ShoppingCart;

impl CartRepository for PgStore {
    #[instrument(skip(self))]
    async fn find_cart(&self, user: UserId) -> Result<Option<ShoppingCart>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_cart(&mut conn, user, false).await
    }

    #[instrument(skip(self))]
    async fn create_cart(&self, user: UserId) -> Result<ShoppingCart, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let id: CartId = sqlx::query_scalar(
            r"
            INSERT INTO bookstore.shopping_cart (user_id)
            VALUES ($1)
            RETURNING id
            ",
        )
        .bind(user)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "cart"))?;

        Ok(ShoppingCart::empty(id, user))
    }

    #[instrument(skip(self))]
    async fn add_cart_item(
        &self,
        cart: CartId,
        book: BookId,
        quantity: Quantity,
    ) -> Result<CartItemId, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let id: Option<CartItemId> = sqlx::query_scalar(
            r"
            INSERT INTO bookstore.cart_item (shopping_cart_id, book_id, quantity)
            SELECT $1, b.id, $3
            FROM bookstore.book b
            WHERE b.id = $2 AND NOT b.is_deleted
            RETURNING id
            ",
        )
        .bind(cart)
        .bind(book)
        .bind(quantity.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        id.ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self))]
    async fn update_cart_item(
        &self,
        item: CartItemId,
        quantity: Quantity,
    ) -> Result<bool, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let result = sqlx::query(
            "UPDATE bookstore.cart_item SET quantity = $2 WHERE id = $1 AND NOT is_deleted",
        )
        .bind(item)
        .bind(quantity.as_i32())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_cart_item(&self, item: CartItemId) -> Result<bool, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let result = sqlx::query(
            "UPDATE bookstore.cart_item SET is_deleted = TRUE WHERE id = $1 AND NOT is_deleted",
        )
        .bind(item)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
