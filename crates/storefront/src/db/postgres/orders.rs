//! Order queries and the order transaction.

use sqlx::{Postgres, Transaction};
use tracing::instrument;

use bookstore_core::{CartId, OrderId, OrderItemId, OrderStatus, Price, UserId};

use super::{OrderRow, PgStore, attach_items, fetch_cart, fetch_order, fetch_user};
use crate::db::{OrderRepository, OrderTransaction, Page, RepositoryError, UnitOfWork};
use crate::models::{NewOrder, NewOrderItem, Order, OrderItem, ShoppingCart, User};

impl OrderRepository for PgStore {
    #[instrument(skip(self))]
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_order(&mut conn, id, false).await
    }

    #[instrument(skip(self))]
    async fn orders_by_user(&self, user: UserId, page: Page) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        // Using runtime query to avoid SQLx offline mode cache requirements
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, status, total, order_date, shipping_address
            FROM bookstore.order
            WHERE user_id = $1 AND NOT is_deleted
            ORDER BY order_date DESC, id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        attach_items(&mut conn, rows).await
    }
}

/// A `PostgreSQL` transaction driving one order workflow.
///
/// Rolls back when dropped without [`OrderTransaction::commit`].
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork for PgStore {
    type Transaction = PgTransaction;

    async fn begin(&self) -> Result<PgTransaction, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(PgTransaction { tx })
    }
}

impl OrderTransaction for PgTransaction {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, RepositoryError> {
        fetch_user(&mut self.tx, id).await
    }

    async fn find_cart(&mut self, user: UserId) -> Result<Option<ShoppingCart>, RepositoryError> {
        fetch_cart(&mut self.tx, user, true).await
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let id = sqlx::query_scalar(
            r"
            INSERT INTO bookstore.order (user_id, status, total, order_date, shipping_address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(order.user_id)
        .bind(order.status)
        .bind(order.total)
        .bind(order.order_date)
        .bind(&order.shipping_address)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn insert_order_item(
        &mut self,
        order: OrderId,
        item: &NewOrderItem,
    ) -> Result<OrderItem, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let id: OrderItemId = sqlx::query_scalar(
            r"
            INSERT INTO bookstore.order_item (order_id, book_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(order)
        .bind(item.book_id)
        .bind(item.quantity.as_i32())
        .bind(item.price)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(OrderItem {
            id,
            order_id: order,
            book_id: item.book_id,
            quantity: item.quantity,
            price: item.price,
        })
    }

    async fn set_order_total(&mut self, order: OrderId, total: Price) -> Result<(), RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        sqlx::query("UPDATE bookstore.order SET total = $2 WHERE id = $1")
            .bind(order)
            .bind(total)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn clear_cart(&mut self, cart: CartId) -> Result<u64, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let result = sqlx::query(
            r"
            UPDATE bookstore.cart_item
            SET is_deleted = TRUE
            WHERE shopping_cart_id = $1 AND NOT is_deleted
            ",
        )
        .bind(cart)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        fetch_order(&mut self.tx, id, true).await
    }

    async fn set_order_status(
        &mut self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let result = sqlx::query("UPDATE bookstore.order SET status = $2 WHERE id = $1")
            .bind(order)
            .bind(status)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
