//! Shopping cart service.
//!
//! Every user has exactly one cart. It is created with the account, and
//! lazily here if an older account is missing one. Item operations only
//! touch lines of the caller's own cart.

use thiserror::Error;
use tracing::instrument;

use bookstore_core::{BookId, CartItemId, Quantity, QuantityError, UserId};

use crate::db::{BookRepository, CartRepository, RepositoryError};
use crate::models::{CartItem, ShoppingCart};

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("can't find book by id: {0}")]
    BookNotFound(BookId),

    /// Missing, or part of another user's cart.
    #[error("can't find cart item by id: {0}")]
    ItemNotFound(CartItemId),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart operations over any store holding carts and books.
pub struct CartService<'a, S> {
    store: &'a S,
}

impl<'a, S> CartService<'a, S>
where
    S: CartRepository + BookRepository,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The user's cart, created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` on storage failure.
    #[instrument(skip(self))]
    pub async fn cart(&self, user: UserId) -> Result<ShoppingCart, CartError> {
        if let Some(cart) = self.store.find_cart(user).await? {
            return Ok(cart);
        }

        match self.store.create_cart(user).await {
            Ok(cart) => {
                tracing::debug!(cart_id = %cart.id, "Created missing cart");
                Ok(cart)
            }
            // Lost a race with another request creating the same cart
            Err(RepositoryError::Conflict(_)) => self
                .store
                .find_cart(user)
                .await?
                .ok_or(CartError::Repository(RepositoryError::NotFound)),
            Err(e) => Err(e.into()),
        }
    }

    /// Add a new line for `book` and return the updated cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::BookNotFound` if the book does not exist.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user: UserId,
        book: BookId,
        quantity: Quantity,
    ) -> Result<ShoppingCart, CartError> {
        if self.store.find_book(book).await?.is_none() {
            return Err(CartError::BookNotFound(book));
        }

        let cart = self.cart(user).await?;
        self.store.add_cart_item(cart.id, book, quantity).await?;
        self.cart(user).await
    }

    /// Change the quantity of one of the user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line is not in the user's cart.
    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        user: UserId,
        item: CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem, CartError> {
        let cart = self.cart(user).await?;
        let mut line = cart.item(item).cloned().ok_or(CartError::ItemNotFound(item))?;

        if !self.store.update_cart_item(item, quantity).await? {
            return Err(CartError::ItemNotFound(item));
        }

        line.quantity = quantity;
        Ok(line)
    }

    /// Remove one of the user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line is not in the user's cart.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user: UserId, item: CartItemId) -> Result<(), CartError> {
        let cart = self.cart(user).await?;
        if cart.item(item).is_none() || !self.store.delete_cart_item(item).await? {
            return Err(CartError::ItemNotFound(item));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use bookstore_core::{Email, Price, RoleName};
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::{MemoryStore, UserRepository};
    use crate::models::{NewBook, NewUser};

    async fn user(store: &MemoryStore, email: &str) -> UserId {
        store
            .create_user(&NewUser {
                email: Email::parse(email).unwrap(),
                password_hash: "hash".to_owned(),
                first_name: "Alan".to_owned(),
                last_name: "Turing".to_owned(),
                shipping_address: "Bletchley Park".to_owned(),
                role: RoleName::User,
            })
            .await
            .unwrap()
            .id
    }

    async fn book(store: &MemoryStore) -> BookId {
        store
            .insert_book(&NewBook {
                title: "Dune".to_owned(),
                author: "Herbert".to_owned(),
                isbn: "978-0441013593".to_owned(),
                price: Price::new(Decimal::new(999, 2)),
                description: "Spice".to_owned(),
                cover_image: "dune.jpg".to_owned(),
                category_ids: BTreeSet::new(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_add_item_creates_new_line_each_time() {
        let store = MemoryStore::new();
        let user = user(&store, "alan@example.com").await;
        let book = book(&store).await;
        let service = CartService::new(&store);

        service.add_item(user, book, Quantity::new(1).unwrap()).await.unwrap();
        let cart = service.add_item(user, book, Quantity::new(2).unwrap()).await.unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].book_title, "Dune");
        assert_eq!(cart.subtotal().amount(), Decimal::new(2997, 2));
    }

    #[tokio::test]
    async fn test_add_item_unknown_book() {
        let store = MemoryStore::new();
        let user = user(&store, "alan@example.com").await;

        let err = CartService::new(&store)
            .add_item(user, BookId::new(404), Quantity::new(1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::BookNotFound(_)));
    }

    #[tokio::test]
    async fn test_items_of_other_carts_are_hidden() {
        let store = MemoryStore::new();
        let alan = user(&store, "alan@example.com").await;
        let joan = user(&store, "joan@example.com").await;
        let book = book(&store).await;
        let service = CartService::new(&store);

        let cart = service.add_item(alan, book, Quantity::new(1).unwrap()).await.unwrap();
        let item = cart.items[0].id;

        let err = service
            .update_item(joan, item, Quantity::new(5).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound(_)));
        assert!(matches!(
            service.remove_item(joan, item).await,
            Err(CartError::ItemNotFound(_))
        ));

        let updated = service.update_item(alan, item, Quantity::new(5).unwrap()).await.unwrap();
        assert_eq!(updated.quantity.get(), 5);
        service.remove_item(alan, item).await.unwrap();
        assert!(service.cart(alan).await.unwrap().items.is_empty());
    }
}
