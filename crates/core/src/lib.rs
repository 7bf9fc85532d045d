//! Bookstore Core - Shared types library.
//!
//! This crate provides the domain types used across all bookstore components:
//! - `storefront` - REST API for books, categories, carts, orders and auth
//! - `cli` - Command-line tools for migrations, seeding and admin accounts
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure logic - no I/O, no
//! database access, no HTTP. Anything here can be unit tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, quantities, emails and statuses
//! - [`search`] - Book search predicates, specification providers and the query builder

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod search;
pub mod types;

pub use search::{
    BookField, BookFields, BookPredicate, BookSearchParameters, BookSpecificationBuilder,
    FieldSpecificationProvider, SearchError, SpecificationProvider,
    SpecificationProviderRegistry,
};
pub use types::*;
