//! Order service.
//!
//! Turns a user's cart into an order, answers order queries for the owner
//! (or an admin), and moves orders through their status lifecycle.
//!
//! Placement and status changes each run in a single [`OrderTransaction`]:
//! a failure at any step drops the transaction and nothing is persisted.

mod error;

pub use error::OrderError;

use chrono::Utc;
use tracing::{info, instrument, warn};

use bookstore_core::{OrderId, OrderItemId, OrderStatus, Price};

use crate::config::CartPolicy;
use crate::db::{OrderRepository, OrderTransaction, Page, UnitOfWork};
use crate::models::{CurrentUser, NewOrder, NewOrderItem, Order, OrderItem};

/// Order workflows over any store that can read orders and open transactions.
pub struct OrderService<'a, S> {
    store: &'a S,
    cart_policy: CartPolicy,
}

impl<'a, S> OrderService<'a, S>
where
    S: OrderRepository + UnitOfWork,
{
    #[must_use]
    pub const fn new(store: &'a S, cart_policy: CartPolicy) -> Self {
        Self { store, cart_policy }
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Place an order from everything in the actor's cart.
    ///
    /// Each item's price is the book's current price times the quantity and
    /// the order total is the sum of the item prices. An empty cart yields an
    /// order with no items and a zero total.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for a blank shipping address,
    /// `OrderError::UserNotFound` / `OrderError::CartNotFound` when the actor
    /// no longer resolves, and `OrderError::Repository` on storage failure.
    #[instrument(skip(self, actor, shipping_address), fields(user_id = %actor.id))]
    pub async fn place_order(
        &self,
        actor: &CurrentUser,
        shipping_address: &str,
    ) -> Result<Order, OrderError> {
        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(OrderError::Validation(
                "shipping address must not be blank".to_owned(),
            ));
        }

        let mut tx = self.store.begin().await?;

        let user = tx
            .find_user(actor.id)
            .await?
            .ok_or(OrderError::UserNotFound(actor.id))?;
        let cart = tx
            .find_cart(user.id)
            .await?
            .ok_or(OrderError::CartNotFound(user.id))?;

        let header = NewOrder {
            user_id: user.id,
            status: OrderStatus::Pending,
            total: Price::zero(),
            order_date: Utc::now(),
            shipping_address: shipping_address.to_owned(),
        };
        let order_id = tx.insert_order(&header).await?;

        let mut items = Vec::with_capacity(cart.items.len());
        for cart_item in &cart.items {
            let line = NewOrderItem {
                book_id: cart_item.book_id,
                quantity: cart_item.quantity,
                price: cart_item.line_total(),
            };
            items.push(tx.insert_order_item(order_id, &line).await?);
        }

        let mut order = Order {
            id: order_id,
            user_id: header.user_id,
            status: header.status,
            total: header.total,
            order_date: header.order_date,
            shipping_address: header.shipping_address,
            items,
        };
        order.total = order.items_total();
        tx.set_order_total(order_id, order.total).await?;

        if self.cart_policy == CartPolicy::Clear {
            let cleared = tx.clear_cart(cart.id).await?;
            tracing::debug!(cart_id = %cart.id, cleared, "Cleared cart after order");
        }

        tx.commit().await?;

        info!(
            order_id = %order_id,
            items = order.items.len(),
            total = %order.total,
            "Order placed"
        );

        Ok(order)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The actor's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` on storage failure.
    #[instrument(skip(self, actor), fields(user_id = %actor.id))]
    pub async fn history(&self, actor: &CurrentUser, page: Page) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.orders_by_user(actor.id, page).await?)
    }

    /// All items of an order visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order does not exist, was
    /// deleted, or belongs to another user and the actor is not an admin.
    #[instrument(skip(self, actor), fields(user_id = %actor.id))]
    pub async fn order_items(
        &self,
        actor: &CurrentUser,
        order_id: OrderId,
    ) -> Result<Vec<OrderItem>, OrderError> {
        Ok(self.visible_order(actor, order_id).await?.items)
    }

    /// One item of an order visible to the actor.
    ///
    /// # Errors
    ///
    /// As [`Self::order_items`], plus `OrderError::OrderItemNotFound` when the
    /// item is not part of that order.
    #[instrument(skip(self, actor), fields(user_id = %actor.id))]
    pub async fn order_item(
        &self,
        actor: &CurrentUser,
        order_id: OrderId,
        item_id: OrderItemId,
    ) -> Result<OrderItem, OrderError> {
        let order = self.visible_order(actor, order_id).await?;
        order
            .item(item_id)
            .cloned()
            .ok_or(OrderError::OrderItemNotFound { order_id, item_id })
    }

    async fn visible_order(&self, actor: &CurrentUser, id: OrderId) -> Result<Order, OrderError> {
        self.store
            .find_order(id)
            .await?
            .filter(|order| order.user_id == actor.id || actor.is_admin())
            .ok_or(OrderError::OrderNotFound(id))
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Move an order to the next status: `PENDING` → `DELIVERED` → `COMPLETED`.
    ///
    /// The order row stays locked until the change commits, so concurrent
    /// calls on the same order are applied one after another.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order does not exist and
    /// `OrderError::InvalidStateTransition` if it is already `COMPLETED`.
    #[instrument(skip(self))]
    pub async fn advance_status(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let mut tx = self.store.begin().await?;

        let mut order = tx
            .lock_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        let from = order.status;
        let Some(next) = from.next() else {
            warn!(order_id = %order_id, status = %from, "Rejected status transition");
            return Err(OrderError::InvalidStateTransition { order_id, from });
        };

        tx.set_order_status(order_id, next).await?;
        tx.commit().await?;

        info!(order_id = %order_id, from = %from, to = %next, "Order status changed");

        order.status = next;
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use bookstore_core::{Email, Quantity, RoleName, UserId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::{BookRepository, CartRepository, MemoryStore, UserRepository};
    use crate::models::{NewBook, NewUser};

    async fn customer(store: &MemoryStore, email: &str) -> CurrentUser {
        let user = store
            .create_user(&NewUser {
                email: Email::parse(email).unwrap(),
                password_hash: "hash".to_owned(),
                first_name: "Grace".to_owned(),
                last_name: "Hopper".to_owned(),
                shipping_address: "1 Compiler Rd".to_owned(),
                role: RoleName::User,
            })
            .await
            .unwrap();
        CurrentUser::from(&user)
    }

    async fn stock(store: &MemoryStore, isbn: &str, cents: i64) -> bookstore_core::BookId {
        store
            .insert_book(&NewBook {
                title: format!("Book {isbn}"),
                author: "Anon".to_owned(),
                isbn: isbn.to_owned(),
                price: Price::new(Decimal::new(cents, 2)),
                description: "A book".to_owned(),
                cover_image: "cover.jpg".to_owned(),
                category_ids: BTreeSet::new(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_place_order_prices_lines_and_total() {
        let store = MemoryStore::new();
        let actor = customer(&store, "grace@example.com").await;
        let cart = store.find_cart(actor.id).await.unwrap().unwrap();
        let a = stock(&store, "1", 1000).await;
        let b = stock(&store, "2", 500).await;
        store.add_cart_item(cart.id, a, Quantity::new(2).unwrap()).await.unwrap();
        store.add_cart_item(cart.id, b, Quantity::new(1).unwrap()).await.unwrap();

        let service = OrderService::new(&store, CartPolicy::Retain);
        let order = service.place_order(&actor, "  2 Main St ").await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.shipping_address, "2 Main St");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].price.amount(), Decimal::new(2000, 2));
        assert_eq!(order.items[1].price.amount(), Decimal::new(500, 2));
        assert_eq!(order.total.amount(), Decimal::new(2500, 2));
        assert_eq!(store.find_order(order.id).await.unwrap().unwrap(), order);
    }

    #[tokio::test]
    async fn test_place_order_rejects_blank_address() {
        let store = MemoryStore::new();
        let actor = customer(&store, "grace@example.com").await;
        let service = OrderService::new(&store, CartPolicy::Retain);

        let err = service.place_order(&actor, "   ").await.unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_place_order_unknown_user() {
        let store = MemoryStore::new();
        let ghost = CurrentUser {
            id: UserId::new(404),
            email: Email::parse("ghost@example.com").unwrap(),
            roles: BTreeSet::from([RoleName::User]),
        };

        let err = OrderService::new(&store, CartPolicy::Retain)
            .place_order(&ghost, "Nowhere")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::UserNotFound(id) if id == ghost.id));
    }

    #[tokio::test]
    async fn test_advance_status_walks_lifecycle() {
        let store = MemoryStore::new();
        let actor = customer(&store, "grace@example.com").await;
        let service = OrderService::new(&store, CartPolicy::Retain);
        let order = service.place_order(&actor, "2 Main St").await.unwrap();

        let delivered = service.advance_status(order.id).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        let completed = service.advance_status(order.id).await.unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);

        let err = service.advance_status(order.id).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidStateTransition { from: OrderStatus::Completed, .. }
        ));
        let stored = store.find_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_advance_status_missing_order() {
        let store = MemoryStore::new();
        let err = OrderService::new(&store, CartPolicy::Retain)
            .advance_status(OrderId::new(7))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound(id) if id == OrderId::new(7)));
    }
}
