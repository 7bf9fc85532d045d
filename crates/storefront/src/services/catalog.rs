//! Catalogue service: books, categories and book search.

use thiserror::Error;
use tracing::instrument;

use bookstore_core::{
    BookId, BookSearchParameters, BookSpecificationBuilder, CategoryId, SearchError,
    SpecificationProviderRegistry,
};

use crate::db::{BookRepository, CategoryRepository, Page, RepositoryError};
use crate::models::{Book, Category, NewBook, NewCategory};

/// Errors raised by catalogue operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("can't find book by id: {0}")]
    BookNotFound(BookId),

    #[error("can't find category by id: {0}")]
    CategoryNotFound(CategoryId),

    #[error("can't find books by category id: {0}")]
    NoBooksInCategory(CategoryId),

    #[error("a book with isbn {0} already exists")]
    DuplicateIsbn(String),

    #[error("{0}")]
    Validation(String),

    /// Search wiring fault, not bad input.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Catalogue operations over any store holding books and categories.
pub struct CatalogService<'a, S> {
    store: &'a S,
    registry: &'a SpecificationProviderRegistry,
}

impl<'a, S> CatalogService<'a, S>
where
    S: BookRepository + CategoryRepository,
{
    #[must_use]
    pub const fn new(store: &'a S, registry: &'a SpecificationProviderRegistry) -> Self {
        Self { store, registry }
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// # Errors
    ///
    /// Returns `CatalogError::Repository` on storage failure.
    pub async fn list_books(&self, page: Page) -> Result<Vec<Book>, CatalogError> {
        Ok(self.store.list_books(page).await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::BookNotFound` if the book does not exist.
    pub async fn book(&self, id: BookId) -> Result<Book, CatalogError> {
        self.store
            .find_book(id)
            .await?
            .ok_or(CatalogError::BookNotFound(id))
    }

    /// Add a book. Category ids that match no category are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for blank fields or a negative
    /// price and `CatalogError::DuplicateIsbn` if the ISBN is taken.
    #[instrument(skip(self, book), fields(isbn = %book.isbn))]
    pub async fn create_book(&self, book: &NewBook) -> Result<Book, CatalogError> {
        validate_book(book)?;
        let saved = self
            .store
            .insert_book(book)
            .await
            .map_err(|e| isbn_conflict(e, &book.isbn))?;

        tracing::info!(book_id = %saved.id, "Book created");
        Ok(saved)
    }

    /// Replace the contents of an existing book.
    ///
    /// # Errors
    ///
    /// As [`Self::create_book`], plus `CatalogError::BookNotFound`.
    #[instrument(skip(self, book))]
    pub async fn update_book(&self, id: BookId, book: &NewBook) -> Result<Book, CatalogError> {
        validate_book(book)?;
        self.store
            .update_book(id, book)
            .await
            .map_err(|e| isbn_conflict(e, &book.isbn))?
            .ok_or(CatalogError::BookNotFound(id))
    }

    /// Soft-delete a book.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::BookNotFound` if the book does not exist.
    #[instrument(skip(self))]
    pub async fn delete_book(&self, id: BookId) -> Result<(), CatalogError> {
        if !self.store.delete_book(id).await? {
            return Err(CatalogError::BookNotFound(id));
        }
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    /// Books matching every present field of `params`.
    ///
    /// Parameters with no fields set match the whole catalogue.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Search` if a field has no registered provider.
    #[instrument(skip(self))]
    pub async fn search_books(
        &self,
        params: &BookSearchParameters,
        page: Page,
    ) -> Result<Vec<Book>, CatalogError> {
        let predicate = BookSpecificationBuilder::new(self.registry).build(params)?;
        Ok(self.store.search_books(&predicate, page).await?)
    }

    /// Books in a category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoBooksInCategory` when the page is empty.
    #[instrument(skip(self))]
    pub async fn books_by_category(
        &self,
        category: CategoryId,
        page: Page,
    ) -> Result<Vec<Book>, CatalogError> {
        let books = self.store.books_by_category(category, page).await?;
        if books.is_empty() {
            return Err(CatalogError::NoBooksInCategory(category));
        }
        Ok(books)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `CatalogError::Repository` on storage failure.
    pub async fn list_categories(&self, page: Page) -> Result<Vec<Category>, CatalogError> {
        Ok(self.store.list_categories(page).await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::CategoryNotFound` if the category does not exist.
    pub async fn category(&self, id: CategoryId) -> Result<Category, CatalogError> {
        self.store
            .find_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for a blank name.
    #[instrument(skip(self, category), fields(name = %category.name))]
    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, CatalogError> {
        validate_category(category)?;
        Ok(self.store.insert_category(category).await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for a blank name and
    /// `CatalogError::CategoryNotFound` if the category does not exist.
    #[instrument(skip(self, category))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Category, CatalogError> {
        validate_category(category)?;
        self.store
            .update_category(id, category)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::CategoryNotFound` if the category does not exist.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), CatalogError> {
        if !self.store.delete_category(id).await? {
            return Err(CatalogError::CategoryNotFound(id));
        }
        Ok(())
    }
}

fn isbn_conflict(err: RepositoryError, isbn: &str) -> CatalogError {
    match err {
        RepositoryError::Conflict(_) => CatalogError::DuplicateIsbn(isbn.to_owned()),
        other => CatalogError::Repository(other),
    }
}

fn require(value: &str, field: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

fn validate_book(book: &NewBook) -> Result<(), CatalogError> {
    require(&book.title, "title")?;
    require(&book.author, "author")?;
    require(&book.isbn, "isbn")?;
    require(&book.description, "description")?;
    require(&book.cover_image, "coverImage")?;
    if book.price.is_negative() {
        return Err(CatalogError::Validation(
            "price must not be negative".to_owned(),
        ));
    }
    Ok(())
}

fn validate_category(category: &NewCategory) -> Result<(), CatalogError> {
    require(&category.name, "name")
}
