//! Domain models for the bookstore.
//!
//! These are validated domain objects, independent of both database rows and
//! the JSON shapes the routes expose.

pub mod book;
pub mod cart;
pub mod category;
pub mod order;
pub mod session;
pub mod user;

pub use book::{Book, NewBook};
pub use cart::{CartItem, ShoppingCart};
pub use category::{Category, NewCategory};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewUser, User};
