//! Integration tests for book search through the catalogue service.

#![allow(clippy::unwrap_used)]

use bookstore_core::{BookSearchParameters, SpecificationProviderRegistry};
use bookstore_integration_tests::book;
use bookstore_storefront::db::{BookRepository, MemoryStore, Page};
use bookstore_storefront::services::catalog::{CatalogError, CatalogService};

async fn shelf() -> MemoryStore {
    let store = MemoryStore::new();
    book(&store, "Dune", "Frank Herbert", "isbn-1", 999).await;
    book(&store, "Children of Dune", "Frank Herbert", "isbn-2", 1099).await;
    book(&store, "Emma", "Jane Austen", "isbn-3", 1250).await;
    book(&store, "Persuasion", "Jane Austen", "isbn-4", 850).await;
    store
}

async fn search(store: &MemoryStore, query: &str) -> Result<Vec<String>, CatalogError> {
    let registry = SpecificationProviderRegistry::with_defaults();
    let params = BookSearchParameters::from_pairs(url::form_urlencoded::parse(query.as_bytes()));
    let books = CatalogService::new(store, &registry)
        .search_books(&params, Page::default())
        .await?;
    Ok(books.into_iter().map(|b| b.title).collect())
}

#[tokio::test]
async fn test_empty_query_returns_catalogue() {
    let store = shelf().await;
    assert_eq!(search(&store, "").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_single_field() {
    let store = shelf().await;
    let titles = search(&store, "author=Jane+Austen").await.unwrap();
    assert_eq!(titles, vec!["Emma", "Persuasion"]);
}

#[tokio::test]
async fn test_values_within_field_are_alternatives() {
    let store = shelf().await;

    let repeated = search(&store, "isbn=isbn-1&isbn=isbn-4").await.unwrap();
    assert_eq!(repeated, vec!["Dune", "Persuasion"]);

    let listed = search(&store, "isbn=isbn-1,isbn-4").await.unwrap();
    assert_eq!(listed, repeated);
}

#[tokio::test]
async fn test_fields_are_combined() {
    let store = shelf().await;
    let titles = search(&store, "author=Frank%20Herbert&title=Dune,Emma")
        .await
        .unwrap();
    assert_eq!(titles, vec!["Dune"]);
}

#[tokio::test]
async fn test_exact_match_only() {
    let store = shelf().await;
    assert!(search(&store, "title=dune").await.unwrap().is_empty());
    assert!(search(&store, "author=Jane").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_keys_are_ignored() {
    let store = shelf().await;
    assert_eq!(search(&store, "genre=scifi").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_deleted_books_are_excluded() {
    let store = shelf().await;
    let dune = search(&store, "title=Dune").await.unwrap();
    assert_eq!(dune.len(), 1);

    let id = store
        .list_books(Page::default())
        .await
        .unwrap()
        .into_iter()
        .find(|b| b.title == "Dune")
        .unwrap()
        .id;
    assert!(store.delete_book(id).await.unwrap());

    assert!(search(&store, "title=Dune").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_provider_is_an_error() {
    let store = shelf().await;
    let registry = SpecificationProviderRegistry::new();
    let params = BookSearchParameters::from_pairs([("title", "Dune")]);

    let result = CatalogService::new(&store, &registry)
        .search_books(&params, Page::default())
        .await;

    assert!(matches!(result, Err(CatalogError::Search(_))));
}
