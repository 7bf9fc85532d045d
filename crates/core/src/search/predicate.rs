//! Backend-neutral book predicates.

use serde::{Deserialize, Serialize};

/// A searchable book column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookField {
    /// Book title.
    Title,
    /// Author name.
    Author,
    /// ISBN.
    Isbn,
}

impl BookField {
    /// All searchable fields, in the order search parameters declare them.
    pub const ALL: [Self; 3] = [Self::Title, Self::Author, Self::Isbn];

    /// Search key and column name of the field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Isbn => "isbn",
        }
    }
}

/// Read access to the searchable columns of a book.
pub trait BookFields {
    /// Value of `field` for this book.
    fn field(&self, field: BookField) -> &str;
}

/// A predicate over books.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookPredicate {
    /// Matches every book.
    All,
    /// The field equals one of `values` (exact, case-sensitive).
    AnyOf {
        /// Column to compare.
        field: BookField,
        /// Accepted values.
        values: Vec<String>,
    },
    /// Every inner predicate holds.
    And(Vec<BookPredicate>),
}

impl BookPredicate {
    /// Build a membership predicate.
    #[must_use]
    pub fn any_of(field: BookField, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::AnyOf {
            field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Conjunction of `self` and `other`.
    ///
    /// `All` is the identity, and nested conjunctions are flattened while
    /// keeping operand order.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, p) | (p, Self::All) => p,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), p) => {
                left.push(p);
                Self::And(left)
            }
            (p, Self::And(right)) => {
                let mut all = Vec::with_capacity(right.len() + 1);
                all.push(p);
                all.extend(right);
                Self::And(all)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    /// Returns `true` if the predicate places no constraint at all.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        match self {
            Self::All => true,
            Self::AnyOf { .. } => false,
            Self::And(parts) => parts.iter().all(Self::is_unconstrained),
        }
    }

    /// Evaluate the predicate against a book.
    pub fn matches<B: BookFields + ?Sized>(&self, book: &B) -> bool {
        match self {
            Self::All => true,
            Self::AnyOf { field, values } => {
                let actual = book.field(*field);
                values.iter().any(|v| v == actual)
            }
            Self::And(parts) => parts.iter().all(|p| p.matches(book)),
        }
    }
}
