//! Query builder: sparse search parameters → one conjunctive predicate.

use serde::{Deserialize, Serialize};

use super::SearchError;
use super::predicate::BookPredicate;
use super::provider::SpecificationProviderRegistry;

/// Search filters, one list of accepted values per field.
///
/// An empty list means "no constraint on this field".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookSearchParameters {
    /// Accepted titles.
    pub title: Vec<String>,
    /// Accepted authors.
    pub author: Vec<String>,
    /// Accepted ISBNs.
    pub isbn: Vec<String>,
}

impl BookSearchParameters {
    /// Collect parameters from decoded query pairs.
    ///
    /// Keys may repeat (`author=a&author=b`) and a value may hold a
    /// comma-separated list (`author=a,b`). Blank values are dropped and
    /// keys other than `title`, `author` and `isbn` are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let target = match key.as_ref() {
                "title" => &mut params.title,
                "author" => &mut params.author,
                "isbn" => &mut params.isbn,
                _ => continue,
            };
            target.extend(
                value
                    .as_ref()
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_owned),
            );
        }
        params
    }

    /// Field keys and their values, in declaration order.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &[String]); 3] {
        [
            ("title", self.title.as_slice()),
            ("author", self.author.as_slice()),
            ("isbn", self.isbn.as_slice()),
        ]
    }

    /// Returns `true` if no field carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, values)| values.is_empty())
    }
}

/// Turns [`BookSearchParameters`] into a [`BookPredicate`].
#[derive(Debug, Clone, Copy)]
pub struct BookSpecificationBuilder<'a> {
    registry: &'a SpecificationProviderRegistry,
}

impl<'a> BookSpecificationBuilder<'a> {
    /// Builder resolving field keys through `registry`.
    #[must_use]
    pub const fn new(registry: &'a SpecificationProviderRegistry) -> Self {
        Self { registry }
    }

    /// AND of the predicates of every non-empty field, in field order.
    ///
    /// With no field set the result is [`BookPredicate::All`].
    ///
    /// # Errors
    ///
    /// Returns `SearchError::ProviderNotFound` if a non-empty field has no
    /// registered provider.
    pub fn build(&self, params: &BookSearchParameters) -> Result<BookPredicate, SearchError> {
        params
            .fields()
            .into_iter()
            .filter(|(_, values)| !values.is_empty())
            .try_fold(BookPredicate::All, |predicate, (key, values)| {
                let provider = self.registry.provider(key)?;
                Ok(predicate.and(provider.build(values)))
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::search::predicate::{BookField, BookFields};
    use crate::search::provider::FieldSpecificationProvider;

    struct Row(&'static str, &'static str, &'static str);

    impl BookFields for Row {
        fn field(&self, field: BookField) -> &str {
            match field {
                BookField::Title => self.0,
                BookField::Author => self.1,
                BookField::Isbn => self.2,
            }
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn test_no_fields_matches_everything() {
        let registry = SpecificationProviderRegistry::with_defaults();
        let predicate = BookSpecificationBuilder::new(&registry)
            .build(&BookSearchParameters::default())
            .unwrap();

        assert_eq!(predicate, BookPredicate::All);
        assert!(predicate.matches(&Row("Dune", "Herbert", "1")));
    }

    #[test]
    fn test_author_only_ignores_other_fields() {
        let registry = SpecificationProviderRegistry::with_defaults();
        let params = BookSearchParameters {
            author: strings(&["Bloch"]),
            ..BookSearchParameters::default()
        };
        let predicate = BookSpecificationBuilder::new(&registry)
            .build(&params)
            .unwrap();

        assert_eq!(
            predicate,
            BookPredicate::any_of(BookField::Author, ["Bloch"])
        );
        assert!(predicate.matches(&Row("Effective Java", "Bloch", "111")));
        assert!(predicate.matches(&Row("Java Puzzlers", "Bloch", "222")));
        assert!(!predicate.matches(&Row("Clean Code", "Martin", "333")));
    }

    #[test]
    fn test_fields_are_anded_in_declared_order() {
        let registry = SpecificationProviderRegistry::with_defaults();
        let params = BookSearchParameters {
            isbn: strings(&["111"]),
            title: strings(&["Effective Java", "Java Puzzlers"]),
            author: Vec::new(),
        };
        let predicate = BookSpecificationBuilder::new(&registry)
            .build(&params)
            .unwrap();

        assert_eq!(
            predicate,
            BookPredicate::And(vec![
                BookPredicate::any_of(BookField::Title, ["Effective Java", "Java Puzzlers"]),
                BookPredicate::any_of(BookField::Isbn, ["111"]),
            ])
        );
        assert!(predicate.matches(&Row("Effective Java", "Bloch", "111")));
        assert!(!predicate.matches(&Row("Java Puzzlers", "Bloch", "222")));
    }

    #[test]
    fn test_missing_provider_fails_only_when_field_is_used() {
        let registry =
            SpecificationProviderRegistry::new().with(FieldSpecificationProvider::new(BookField::Title));
        let builder = BookSpecificationBuilder::new(&registry);

        let title_only = BookSearchParameters {
            title: strings(&["Dune"]),
            ..BookSearchParameters::default()
        };
        assert!(builder.build(&title_only).is_ok());

        let with_author = BookSearchParameters {
            author: strings(&["Herbert"]),
            ..title_only
        };
        assert_eq!(
            builder.build(&with_author),
            Err(SearchError::ProviderNotFound {
                key: "author".to_owned()
            })
        );
    }

    #[test]
    fn test_from_pairs_handles_repeats_commas_and_blanks() {
        let params = BookSearchParameters::from_pairs([
            ("author", "Bloch, Martin"),
            ("author", "Fowler"),
            ("title", ""),
            ("isbn", " 42 "),
            ("page", "3"),
        ]);

        assert_eq!(params.author, strings(&["Bloch", "Martin", "Fowler"]));
        assert!(params.title.is_empty());
        assert_eq!(params.isbn, strings(&["42"]));
        assert!(!params.is_empty());
        assert!(BookSearchParameters::from_pairs(Vec::<(String, String)>::new()).is_empty());
    }
}
