//! Specification providers and their registry.

use std::collections::BTreeMap;
use std::fmt;

use super::SearchError;
use super::predicate::{BookField, BookPredicate};

/// Builds the predicate for one search key.
pub trait SpecificationProvider: Send + Sync {
    /// Search key this provider answers to.
    fn key(&self) -> &'static str;

    /// Predicate selecting books whose field is one of `values`.
    fn build(&self, values: &[String]) -> BookPredicate;
}

/// Exact-membership provider for a single book column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpecificationProvider {
    field: BookField,
}

impl FieldSpecificationProvider {
    /// Provider for `field`.
    #[must_use]
    pub const fn new(field: BookField) -> Self {
        Self { field }
    }
}

impl SpecificationProvider for FieldSpecificationProvider {
    fn key(&self) -> &'static str {
        self.field.key()
    }

    fn build(&self, values: &[String]) -> BookPredicate {
        BookPredicate::any_of(self.field, values.iter().cloned())
    }
}

/// Maps search keys to providers.
///
/// Populated once when the application starts; lookups never mutate it.
#[derive(Default)]
pub struct SpecificationProviderRegistry {
    providers: BTreeMap<&'static str, Box<dyn SpecificationProvider>>,
}

impl SpecificationProviderRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `title`, `author` and `isbn` providers.
    #[must_use]
    pub fn with_defaults() -> Self {
        BookField::ALL
            .into_iter()
            .fold(Self::new(), |registry, field| {
                registry.with(FieldSpecificationProvider::new(field))
            })
    }

    /// Add a provider, replacing any previous one for the same key.
    #[must_use]
    pub fn with(mut self, provider: impl SpecificationProvider + 'static) -> Self {
        self.providers.insert(provider.key(), Box::new(provider));
        self
    }

    /// Look up the provider for `key`.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::ProviderNotFound` if nothing is registered under `key`.
    pub fn provider(&self, key: &str) -> Result<&dyn SpecificationProvider, SearchError> {
        self.providers
            .get(key)
            .map(|p| &**p)
            .ok_or_else(|| SearchError::ProviderNotFound {
                key: key.to_owned(),
            })
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.providers.keys().copied()
    }
}

impl fmt::Debug for SpecificationProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecificationProviderRegistry")
            .field("keys", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_fields() {
        let registry = SpecificationProviderRegistry::with_defaults();
        assert_eq!(
            registry.keys().collect::<Vec<_>>(),
            ["author", "isbn", "title"]
        );
    }

    #[test]
    fn test_provider_builds_membership_predicate() {
        let registry = SpecificationProviderRegistry::with_defaults();
        let provider = registry.provider("isbn").unwrap();
        let values = vec!["1".to_owned(), "2".to_owned()];

        assert_eq!(
            provider.build(&values),
            BookPredicate::AnyOf {
                field: BookField::Isbn,
                values,
            }
        );
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let registry = SpecificationProviderRegistry::with_defaults();
        let err = registry.provider("publisher").err().unwrap();
        assert_eq!(
            err,
            SearchError::ProviderNotFound {
                key: "publisher".to_owned()
            }
        );
        assert!(err.to_string().contains("publisher"));
    }

    #[test]
    fn test_empty_registry_has_no_providers() {
        let registry = SpecificationProviderRegistry::new();
        assert!(registry.provider("title").is_err());
    }
}
