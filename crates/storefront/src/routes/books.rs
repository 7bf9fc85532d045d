//! Book route handlers.

use std::collections::BTreeSet;

use axum::{
    Json,
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bookstore_core::{BookId, BookSearchParameters, CategoryId, Price};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Book, NewBook};
use crate::routes::PageQuery;
use crate::state::AppState;

/// Create or replace request for a book.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    pub description: String,
    pub cover_image: String,
    #[serde(default)]
    pub category_ids: BTreeSet<CategoryId>,
}

impl From<BookRequest> for NewBook {
    fn from(request: BookRequest) -> Self {
        Self {
            title: request.title.trim().to_owned(),
            author: request.author.trim().to_owned(),
            isbn: request.isbn.trim().to_owned(),
            price: Price::new(request.price),
            description: request.description,
            cover_image: request.cover_image,
            category_ids: request.category_ids,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Price,
    pub description: String,
    pub cover_image: String,
    pub category_ids: BTreeSet<CategoryId>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            price: book.price,
            description: book.description,
            cover_image: book.cover_image,
            category_ids: book.category_ids,
        }
    }
}

/// Book as listed under a category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummaryResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Price,
    pub description: String,
    pub cover_image: String,
}

impl From<Book> for BookSummaryResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            price: book.price,
            description: book.description,
            cover_image: book.cover_image,
        }
    }
}

fn respond(books: Vec<Book>) -> Json<Vec<BookResponse>> {
    Json(books.into_iter().map(BookResponse::from).collect())
}

/// List books.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<BookResponse>>> {
    let books = state.catalog().list_books(page.into()).await?;
    Ok(respond(books))
}

/// Search books.
///
/// Each of `title`, `author` and `isbn` may repeat or hold a comma-separated
/// list: values of one field are alternatives, different fields must all match.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<BookResponse>>> {
    let params = BookSearchParameters::from_pairs(url::form_urlencoded::parse(
        query.as_deref().unwrap_or_default().as_bytes(),
    ));
    let books = state.catalog().search_books(&params, page.into()).await?;
    Ok(respond(books))
}

/// Show one book.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<Json<BookResponse>> {
    let book = state.catalog().book(id).await?;
    Ok(Json(book.into()))
}

/// Create a book.
#[instrument(skip(state, request), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<BookRequest>,
) -> Result<Json<BookResponse>> {
    let book = state.catalog().create_book(&request.into()).await?;
    Ok(Json(book.into()))
}

/// Replace a book.
#[instrument(skip(state, request), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BookId>,
    Json(request): Json<BookRequest>,
) -> Result<Json<BookResponse>> {
    let book = state.catalog().update_book(id, &request.into()).await?;
    Ok(Json(book.into()))
}

/// Delete a book.
#[instrument(skip(state), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BookId>,
) -> Result<StatusCode> {
    state.catalog().delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_book_request_is_camel_case() {
        let request: BookRequest = serde_json::from_str(
            r#"{
                "title": " Dune ",
                "author": "Frank Herbert",
                "isbn": "978-0441013593",
                "price": "9.99",
                "description": "Spice",
                "coverImage": "dune.jpg",
                "categoryIds": [3, 1]
            }"#,
        )
        .unwrap();

        let book = NewBook::from(request);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.price.amount(), Decimal::new(999, 2));
        assert_eq!(
            book.category_ids.into_iter().collect::<Vec<_>>(),
            vec![CategoryId::new(1), CategoryId::new(3)]
        );
    }

    #[test]
    fn test_summary_omits_categories() {
        let book = Book {
            id: BookId::new(1),
            title: "Dune".to_owned(),
            author: "Frank Herbert".to_owned(),
            isbn: "1".to_owned(),
            price: Price::new(Decimal::new(999, 2)),
            description: "Spice".to_owned(),
            cover_image: "dune.jpg".to_owned(),
            category_ids: BTreeSet::from([CategoryId::new(2)]),
        };

        let json = serde_json::to_value(BookSummaryResponse::from(book)).unwrap();
        assert_eq!(json["coverImage"], "dune.jpg");
        assert!(json.get("categoryIds").is_none());
    }
}
