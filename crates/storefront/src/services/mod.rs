//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `cart` - Shopping cart lines
//! - `catalog` - Books, categories and book search
//! - `orders` - Order placement, order queries and status changes
//!
//! Services borrow a store for the duration of one call and are generic over
//! the repository traits in [`crate::db`], so the same code runs against
//! `PostgreSQL` in production and the in-memory store in tests.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
