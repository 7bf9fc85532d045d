//! Shopping cart types.

use bookstore_core::{BookId, CartId, CartItemId, Price, Quantity, UserId};

/// One line of a shopping cart, with the book it references loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// Cart item ID.
    pub id: CartItemId,
    /// Referenced book.
    pub book_id: BookId,
    /// Title of the referenced book.
    pub book_title: String,
    /// Current unit price of the referenced book.
    pub book_price: Price,
    /// Requested quantity (always positive).
    pub quantity: Quantity,
}

impl CartItem {
    /// Unit price times quantity at the book's current price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.book_price.line_total(self.quantity)
    }
}

/// A user's shopping cart.
///
/// Every user owns exactly one cart. Items are ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingCart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
}

impl ShoppingCart {
    /// An empty cart.
    #[must_use]
    pub const fn empty(id: CartId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            items: Vec::new(),
        }
    }

    /// Look up an item of this cart.
    #[must_use]
    pub fn item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Sum of all line totals at current book prices.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: i64, cents: i64, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            book_id: BookId::new(id * 10),
            book_title: format!("Book {id}"),
            book_price: Price::new(Decimal::new(cents, 2)),
            quantity: Quantity::new(quantity).unwrap(),
        }
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let cart = ShoppingCart {
            id: CartId::new(1),
            user_id: UserId::new(1),
            items: vec![item(1, 1000, 2), item(2, 550, 1)],
        };

        assert_eq!(cart.subtotal().amount(), Decimal::new(2550, 2));
        assert_eq!(cart.item(CartItemId::new(2)).unwrap().book_title, "Book 2");
        assert!(cart.item(CartItemId::new(3)).is_none());
    }

    #[test]
    fn test_empty_cart() {
        let cart = ShoppingCart::empty(CartId::new(4), UserId::new(9));
        assert!(cart.items.is_empty());
        assert_eq!(cart.subtotal(), Price::zero());
    }
}
