//! Book search.
//!
//! A search request is a sparse set of field filters (`title`, `author`,
//! `isbn`), each holding one or more exact values. The pieces:
//!
//! - [`BookPredicate`] - a backend-neutral predicate tree. The storefront
//!   renders it to SQL; [`BookPredicate::matches`] evaluates it in memory.
//! - [`SpecificationProvider`] - builds the predicate for one field key.
//! - [`SpecificationProviderRegistry`] - key → provider map, built once at
//!   start-up and read-only afterwards.
//! - [`BookSpecificationBuilder`] - ANDs the predicates of every present
//!   field of a [`BookSearchParameters`].
//!
//! ```
//! use bookstore_core::search::{
//!     BookSearchParameters, BookSpecificationBuilder, SpecificationProviderRegistry,
//! };
//!
//! let registry = SpecificationProviderRegistry::with_defaults();
//! let params = BookSearchParameters {
//!     author: vec!["Bloch".to_owned()],
//!     ..BookSearchParameters::default()
//! };
//!
//! let predicate = BookSpecificationBuilder::new(&registry).build(&params).unwrap();
//! assert!(!predicate.is_unconstrained());
//! ```

mod builder;
mod predicate;
mod provider;

pub use builder::{BookSearchParameters, BookSpecificationBuilder};
pub use predicate::{BookField, BookFields, BookPredicate};
pub use provider::{FieldSpecificationProvider, SpecificationProvider, SpecificationProviderRegistry};

/// Errors raised while assembling a search predicate.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// No provider is registered for a field key. This is a wiring fault,
    /// not bad user input.
    #[error("could not find specification provider for key: {key}")]
    ProviderNotFound {
        /// The key that was looked up.
        key: String,
    },
}
