//! Persistence for the bookstore.
//!
//! # Layout
//!
//! - [`ports`] - repository traits the services are written against
//! - [`postgres`] - `PgStore`, the `PostgreSQL` adapter used in production
//! - [`memory`] - `MemoryStore`, an in-process adapter with the same
//!   transactional semantics, used by tests and local tooling
//!
//! # Database schema: `bookstore`
//!
//! - `role`, `user`, `user_role` - accounts and their roles
//! - `shopping_cart`, `cart_item` - one cart per user
//! - `book`, `category`, `book_category` - the catalogue
//! - `order`, `order_item` - placed orders
//!
//! Rows are soft-deleted through an `is_deleted` flag; every read filters on it.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p bookstore-cli -- migrate
//! ```

pub mod memory;
pub mod ports;
pub mod postgres;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryStore;
pub use ports::{
    BookRepository, CartRepository, CategoryRepository, OrderRepository, OrderTransaction,
    UnitOfWork, UserRepository,
};
pub use postgres::{PgStore, PgTransaction};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// A zero-based page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    /// Page size used when the client does not ask for one.
    pub const DEFAULT_SIZE: u32 = 20;
    /// Largest page size a client may request.
    pub const MAX_SIZE: u32 = 100;

    /// Page `number` of `size` rows; `size` is clamped to `1..=MAX_SIZE`.
    #[must_use]
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number,
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    #[must_use]
    pub const fn number(self) -> u32 {
        self.number
    }

    #[must_use]
    pub const fn size(self) -> u32 {
        self.size
    }

    /// SQL `LIMIT`.
    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.size)
    }

    /// SQL `OFFSET`.
    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.number) * i64::from(self.size)
    }

    /// Take this page out of an already ordered sequence.
    pub fn slice<T>(self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.size).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}
