//! Status enums for orders and accounts.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders move strictly forward: `Pending → Delivered → Completed`.
/// `Completed` is terminal; there is no cancellation path.
///
/// ```
/// use bookstore_core::OrderStatus;
///
/// assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Delivered));
/// assert_eq!(OrderStatus::Delivered.next(), Some(OrderStatus::Completed));
/// assert_eq!(OrderStatus::Completed.next(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(
        type_name = "bookstore.order_status",
        rename_all = "SCREAMING_SNAKE_CASE"
    )
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order placed, not yet shipped.
    #[default]
    Pending,
    /// Books handed to the customer.
    Delivered,
    /// Order closed.
    Completed,
}

impl OrderStatus {
    /// The status an order moves to when advanced, or `None` when terminal.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Delivered),
            Self::Delivered => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Wire and database name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "bookstore.role_name", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    /// Regular customer: browse, cart, order.
    User,
    /// Store staff: catalogue management and order status updates.
    Admin,
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for RoleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only_transitions() {
        let mut status = OrderStatus::default();
        assert_eq!(status, OrderStatus::Pending);

        let mut visited = vec![status];
        while let Some(next) = status.next() {
            status = next;
            visited.push(status);
        }

        assert_eq!(
            visited,
            [
                OrderStatus::Pending,
                OrderStatus::Delivered,
                OrderStatus::Completed
            ]
        );
        assert_eq!(status.next(), None);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(OrderStatus::Delivered.to_string(), "DELIVERED");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
    }

    #[test]
    fn test_role_name_parse() {
        assert_eq!("ADMIN".parse::<RoleName>(), Ok(RoleName::Admin));
        assert_eq!(RoleName::User.to_string(), "USER");
        assert!("admin".parse::<RoleName>().is_err());
    }
}
