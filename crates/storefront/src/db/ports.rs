//! Repository traits.
//!
//! Services depend on these traits, never on a concrete store. Every
//! not-found case is an `Ok(None)` (or `Ok(false)` for writes), so callers
//! decide which domain error it becomes.

use std::future::Future;

use bookstore_core::{
    BookId, BookPredicate, CartId, CartItemId, CategoryId, Email, OrderId, OrderStatus, Price,
    Quantity, UserId,
};

use super::{Page, RepositoryError};
use crate::models::{
    Book, Category, NewBook, NewCategory, NewOrder, NewOrderItem, NewUser, Order, OrderItem,
    ShoppingCart, User,
};

/// Book catalogue storage.
pub trait BookRepository: Send + Sync {
    /// Get a live (not deleted) book.
    fn find_book(
        &self,
        id: BookId,
    ) -> impl Future<Output = Result<Option<Book>, RepositoryError>> + Send;

    /// Live books ordered by id.
    fn list_books(&self, page: Page)
    -> impl Future<Output = Result<Vec<Book>, RepositoryError>> + Send;

    /// Live books matching `predicate`, ordered by id.
    fn search_books(
        &self,
        predicate: &BookPredicate,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Book>, RepositoryError>> + Send;

    /// Live books in a category, ordered by id.
    fn books_by_category(
        &self,
        category: CategoryId,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Book>, RepositoryError>> + Send;

    /// Insert a book. Category ids with no live category are dropped.
    ///
    /// Fails with `RepositoryError::Conflict` on a duplicate ISBN.
    fn insert_book(
        &self,
        book: &NewBook,
    ) -> impl Future<Output = Result<Book, RepositoryError>> + Send;

    /// Replace a live book's contents. `Ok(None)` if it does not exist.
    fn update_book(
        &self,
        id: BookId,
        book: &NewBook,
    ) -> impl Future<Output = Result<Option<Book>, RepositoryError>> + Send;

    /// Soft-delete a book. `Ok(false)` if it did not exist.
    fn delete_book(&self, id: BookId)
    -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Category storage.
pub trait CategoryRepository: Send + Sync {
    fn find_category(
        &self,
        id: CategoryId,
    ) -> impl Future<Output = Result<Option<Category>, RepositoryError>> + Send;

    fn list_categories(
        &self,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Category>, RepositoryError>> + Send;

    fn insert_category(
        &self,
        category: &NewCategory,
    ) -> impl Future<Output = Result<Category, RepositoryError>> + Send;

    fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> impl Future<Output = Result<Option<Category>, RepositoryError>> + Send;

    fn delete_category(
        &self,
        id: CategoryId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Shopping cart storage.
pub trait CartRepository: Send + Sync {
    /// The user's cart with its items and their books, in one call.
    ///
    /// Lines whose book was deleted are left out.
    fn find_cart(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Option<ShoppingCart>, RepositoryError>> + Send;

    /// Create an empty cart for a user that has none.
    fn create_cart(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<ShoppingCart, RepositoryError>> + Send;

    /// Add a new line to a cart.
    fn add_cart_item(
        &self,
        cart: CartId,
        book: BookId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<CartItemId, RepositoryError>> + Send;

    /// Change the quantity of a line. `Ok(false)` if it does not exist.
    fn update_cart_item(
        &self,
        item: CartItemId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Remove a line. `Ok(false)` if it does not exist.
    fn delete_cart_item(
        &self,
        item: CartItemId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Account storage.
pub trait UserRepository: Send + Sync {
    fn find_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// The user and their password hash, for login.
    fn find_credentials(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<(User, String)>, RepositoryError>> + Send;

    /// Create a user, their empty cart and their role assignment atomically.
    ///
    /// The role row is fetched or created inside the same transaction.
    /// Fails with `RepositoryError::Conflict` if the email is taken.
    fn create_user(
        &self,
        user: &NewUser,
    ) -> impl Future<Output = Result<User, RepositoryError>> + Send;
}

/// Read side of order storage.
pub trait OrderRepository: Send + Sync {
    /// A live order with its live items, in one call.
    fn find_order(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// A user's live orders, newest first.
    fn orders_by_user(
        &self,
        user: UserId,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;
}

/// Starts atomic order workflows.
pub trait UnitOfWork: Send + Sync {
    /// Transaction type handed out by [`UnitOfWork::begin`].
    type Transaction: OrderTransaction;

    /// Begin a transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction, RepositoryError>> + Send;
}

/// Steps of order placement and status changes, run in one transaction.
///
/// Nothing is visible to other readers until [`OrderTransaction::commit`].
/// Dropping the transaction without committing discards every write.
pub trait OrderTransaction: Send {
    fn find_user(
        &mut self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// The user's cart with items and books, locked against concurrent
    /// placements until the transaction ends. Lines whose book was deleted
    /// are left out.
    fn find_cart(
        &mut self,
        user: UserId,
    ) -> impl Future<Output = Result<Option<ShoppingCart>, RepositoryError>> + Send;

    /// Insert an order header and return its id.
    fn insert_order(
        &mut self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<OrderId, RepositoryError>> + Send;

    fn insert_order_item(
        &mut self,
        order: OrderId,
        item: &NewOrderItem,
    ) -> impl Future<Output = Result<OrderItem, RepositoryError>> + Send;

    fn set_order_total(
        &mut self,
        order: OrderId,
        total: Price,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove every item of a cart, keeping the cart itself.
    fn clear_cart(
        &mut self,
        cart: CartId,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Load a live order and lock it against concurrent status changes
    /// until the transaction ends.
    fn lock_order(
        &mut self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    fn set_order_status(
        &mut self,
        order: OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Make every write of this transaction visible.
    fn commit(self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
