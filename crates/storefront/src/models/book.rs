//! Book catalogue types.

use std::collections::BTreeSet;

use bookstore_core::{BookField, BookFields, BookId, CategoryId, Price};

/// A book in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Book ID.
    pub id: BookId,
    /// Title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// ISBN, unique across the catalogue.
    pub isbn: String,
    /// Current unit price.
    pub price: Price,
    /// Description.
    pub description: String,
    /// Cover image URL.
    pub cover_image: String,
    /// Categories the book belongs to.
    pub category_ids: BTreeSet<CategoryId>,
}

impl BookFields for Book {
    fn field(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Isbn => &self.isbn,
        }
    }
}

/// Validated book contents, used both to create and to replace a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Price,
    pub description: String,
    pub cover_image: String,
    /// Requested categories. Ids with no matching category are dropped on save.
    pub category_ids: BTreeSet<CategoryId>,
}

impl NewBook {
    /// Attach an id, producing the stored book.
    #[must_use]
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            price: self.price,
            description: self.description,
            cover_image: self.cover_image,
            category_ids: self.category_ids,
        }
    }
}
