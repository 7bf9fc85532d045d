//! Integration tests for the online bookstore.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bookstore-integration-tests
//! ```
//!
//! The service-level suites run against [`MemoryStore`]; the router suite
//! builds the full axum app over a lazily connected pool and only exercises
//! paths that never reach the database.
//!
//! # Test Categories
//!
//! - `order_placement` - Cart to order conversion
//! - `order_status` - Status lifecycle
//! - `order_queries` - History and item lookups
//! - `book_search` - Query-string search
//! - `router` - HTTP surface

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use rust_decimal::Decimal;

use bookstore_core::{
    BookId, CartId, Email, OrderId, OrderStatus, Price, Quantity, RoleName, UserId,
};
use bookstore_storefront::config::CartPolicy;
use bookstore_storefront::db::{
    BookRepository, MemoryStore, OrderRepository, OrderTransaction, Page, RepositoryError,
    UnitOfWork, UserRepository,
};
use bookstore_storefront::db::memory::MemoryTransaction;
use bookstore_storefront::models::{
    Book, CurrentUser, NewBook, NewOrder, NewOrderItem, NewUser, Order, OrderItem, ShoppingCart,
    User,
};
use bookstore_storefront::services::cart::CartService;
use bookstore_storefront::services::orders::OrderService;

// =============================================================================
// Fixtures
// =============================================================================

/// A price in cents.
#[must_use]
pub fn price(cents: i64) -> Price {
    Price::new(Decimal::new(cents, 2))
}

/// Register an account with `role` and return its session identity.
pub async fn account(store: &MemoryStore, email: &str, role: RoleName) -> CurrentUser {
    let user = store
        .create_user(&NewUser {
            email: Email::parse(email).unwrap(),
            password_hash: "$argon2id$test".to_owned(),
            first_name: "Test".to_owned(),
            last_name: "Reader".to_owned(),
            shipping_address: "1 Library Lane".to_owned(),
            role,
        })
        .await
        .unwrap();
    CurrentUser::from(&user)
}

/// Register a customer.
pub async fn customer(store: &MemoryStore, email: &str) -> CurrentUser {
    account(store, email, RoleName::User).await
}

/// Register an admin.
pub async fn admin(store: &MemoryStore, email: &str) -> CurrentUser {
    account(store, email, RoleName::Admin).await
}

/// Add a book with no categories.
pub async fn book(store: &MemoryStore, title: &str, author: &str, isbn: &str, cents: i64) -> Book {
    store
        .insert_book(&NewBook {
            title: title.to_owned(),
            author: author.to_owned(),
            isbn: isbn.to_owned(),
            price: price(cents),
            description: format!("{title} by {author}"),
            cover_image: format!("https://covers.example.com/{isbn}.jpg"),
            category_ids: std::collections::BTreeSet::new(),
        })
        .await
        .unwrap()
}

/// Put `quantity` copies of `book` in the user's cart.
pub async fn add_to_cart(
    store: &MemoryStore,
    user: &CurrentUser,
    book: BookId,
    quantity: u32,
) -> ShoppingCart {
    CartService::new(store)
        .add_item(user.id, book, Quantity::new(quantity).unwrap())
        .await
        .unwrap()
}

/// Place an order for `user` with the default address.
pub async fn place(store: &MemoryStore, user: &CurrentUser) -> Order {
    OrderService::new(store, CartPolicy::Retain)
        .place_order(user, "221B Baker Street")
        .await
        .unwrap()
}

// =============================================================================
// Failure injection
// =============================================================================

/// A [`MemoryStore`] whose transactions fail after inserting a fixed number
/// of order items.
#[derive(Debug, Clone)]
pub struct FailingStore {
    inner: MemoryStore,
    items_before_failure: usize,
}

impl FailingStore {
    #[must_use]
    pub const fn new(inner: MemoryStore, items_before_failure: usize) -> Self {
        Self {
            inner,
            items_before_failure,
        }
    }
}

/// Transaction of a [`FailingStore`].
pub struct FailingTransaction {
    inner: MemoryTransaction,
    remaining: usize,
}

impl OrderRepository for FailingStore {
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.inner.find_order(id).await
    }

    async fn orders_by_user(&self, user: UserId, page: Page) -> Result<Vec<Order>, RepositoryError> {
        self.inner.orders_by_user(user, page).await
    }
}

impl UnitOfWork for FailingStore {
    type Transaction = FailingTransaction;

    async fn begin(&self) -> Result<FailingTransaction, RepositoryError> {
        Ok(FailingTransaction {
            inner: self.inner.begin().await?,
            remaining: self.items_before_failure,
        })
    }
}

impl OrderTransaction for FailingTransaction {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.find_user(id).await
    }

    async fn find_cart(&mut self, user: UserId) -> Result<Option<ShoppingCart>, RepositoryError> {
        self.inner.find_cart(user).await
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        self.inner.insert_order(order).await
    }

    async fn insert_order_item(
        &mut self,
        order: OrderId,
        item: &NewOrderItem,
    ) -> Result<OrderItem, RepositoryError> {
        if self.remaining == 0 {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        self.remaining -= 1;
        self.inner.insert_order_item(order, item).await
    }

    async fn set_order_total(&mut self, order: OrderId, total: Price) -> Result<(), RepositoryError> {
        self.inner.set_order_total(order, total).await
    }

    async fn clear_cart(&mut self, cart: CartId) -> Result<u64, RepositoryError> {
        self.inner.clear_cart(cart).await
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.inner.lock_order(id).await
    }

    async fn set_order_status(
        &mut self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.set_order_status(order, status).await
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.inner.commit().await
    }
}
