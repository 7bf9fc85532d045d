//! Order error types.

use thiserror::Error;

use bookstore_core::{OrderId, OrderItemId, OrderStatus, UserId};

use crate::db::RepositoryError;

/// Errors raised by order placement, queries and status changes.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Request rejected before touching storage.
    #[error("{0}")]
    Validation(String),

    #[error("can't find user by id: {0}")]
    UserNotFound(UserId),

    #[error("can't find shopping cart for user: {0}")]
    CartNotFound(UserId),

    /// Missing, soft-deleted, or owned by someone else.
    #[error("can't find order by id: {0}")]
    OrderNotFound(OrderId),

    #[error("can't find item {item_id} in order {order_id}")]
    OrderItemNotFound {
        order_id: OrderId,
        item_id: OrderItemId,
    },

    /// The order is already in a terminal status.
    #[error("order {order_id} is {from} and can't move to another status")]
    InvalidStateTransition { order_id: OrderId, from: OrderStatus },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
