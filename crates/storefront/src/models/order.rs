//! Order types.
//!
//! An order is an immutable snapshot of a cart: every line carries the price
//! computed when the order was placed, and the total is the sum of those
//! lines. Only the status changes afterwards.

use chrono::{DateTime, Utc};

use bookstore_core::{BookId, OrderId, OrderItemId, OrderStatus, Price, Quantity, UserId};

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub book_id: BookId,
    pub quantity: Quantity,
    /// Unit price at order time times quantity.
    pub price: Price,
}

/// A placed order with its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Price,
    pub order_date: DateTime<Utc>,
    pub shipping_address: String,
    /// Items ordered by id.
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Look up an item of this order.
    #[must_use]
    pub fn item(&self, id: OrderItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Sum of the item prices.
    #[must_use]
    pub fn items_total(&self) -> Price {
        self.items.iter().map(|item| item.price).sum()
    }
}

/// Order header written at the start of placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Price,
    pub order_date: DateTime<Utc>,
    pub shipping_address: String,
}

/// Order line written during placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub book_id: BookId,
    pub quantity: Quantity,
    pub price: Price,
}
