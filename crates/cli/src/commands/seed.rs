//! Seed the catalogue with categories and books from a YAML file.
//!
//! ```yaml
//! categories:
//!   - name: Fiction
//!     description: Novels and short stories
//! books:
//!   - title: Dune
//!     author: Frank Herbert
//!     isbn: "978-0441013593"
//!     price: "9.99"
//!     description: Desert planet epic
//!     coverImage: https://covers.example.com/dune.jpg
//!     categories: [Fiction]
//! ```
//!
//! Categories are matched by name, so re-running a seed reuses existing
//! categories. Books whose ISBN already exists are skipped.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info, warn};

use bookstore_core::{CategoryId, Price, SpecificationProviderRegistry};
use bookstore_storefront::db::{Page, PgStore};
use bookstore_storefront::models::{NewBook, NewCategory};
use bookstore_storefront::services::catalog::{CatalogError, CatalogService};

/// Top-level seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub books: Vec<BookSeed>,
}

#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSeed {
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub description: String,
    pub cover_image: String,
    /// Category names.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Check a parsed seed file without touching the database.
///
/// Returns one message per problem found.
#[must_use]
pub fn validate(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();
    let mut isbns = BTreeSet::new();
    let names: BTreeSet<&str> = seed.categories.iter().map(|c| c.name.as_str()).collect();

    for category in &seed.categories {
        if category.name.trim().is_empty() {
            errors.push("category with a blank name".to_owned());
        }
    }

    for book in &seed.books {
        if book.title.trim().is_empty() {
            errors.push(format!("book {}: blank title", book.isbn));
        }
        if book.price.is_sign_negative() && !book.price.is_zero() {
            errors.push(format!("book {}: negative price", book.isbn));
        }
        if !isbns.insert(book.isbn.as_str()) {
            errors.push(format!("book {}: isbn listed twice", book.isbn));
        }
        for name in &book.categories {
            if !names.contains(name.as_str()) {
                errors.push(format!("book {}: unknown category {name}", book.isbn));
            }
        }
    }

    errors
}

/// Load the seed file at `file_path` into the catalogue.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or a database
/// operation fails.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalogue seed");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!(
        categories = seed.categories.len(),
        books = seed.books.len(),
        "Seed validated"
    );

    let store = PgStore::new(super::connect().await?);
    let registry = SpecificationProviderRegistry::with_defaults();
    let catalog = CatalogService::new(&store, &registry);

    let mut category_ids = existing_categories(&catalog).await?;
    let mut categories_created = 0_usize;
    for category in &seed.categories {
        if category_ids.contains_key(&category.name) {
            continue;
        }
        let created = catalog
            .create_category(&NewCategory {
                name: category.name.clone(),
                description: category.description.clone(),
            })
            .await?;
        category_ids.insert(created.name, created.id);
        categories_created += 1;
    }

    let mut inserted = 0_usize;
    let mut skipped = 0_usize;
    for book in &seed.books {
        let new_book = NewBook {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            price: Price::new(book.price),
            description: book.description.clone(),
            cover_image: book.cover_image.clone(),
            category_ids: book
                .categories
                .iter()
                .filter_map(|name| category_ids.get(name).copied())
                .collect(),
        };
        match catalog.create_book(&new_book).await {
            Ok(_) => inserted += 1,
            Err(CatalogError::DuplicateIsbn(isbn)) => {
                warn!(%isbn, "Book already exists, skipping");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeding complete!");
    info!("  Categories created: {categories_created}");
    info!("  Books inserted: {inserted}");
    info!("  Books skipped (already exist): {skipped}");

    Ok(())
}

async fn existing_categories(
    catalog: &CatalogService<'_, PgStore>,
) -> Result<HashMap<String, CategoryId>, CatalogError> {
    let mut ids = HashMap::new();
    let mut number = 0;
    loop {
        let page = Page::new(number, Page::MAX_SIZE);
        let batch = catalog.list_categories(page).await?;
        let done = batch.len() < page.limit().try_into().unwrap_or(usize::MAX);
        ids.extend(batch.into_iter().map(|c| (c.name, c.id)));
        if done {
            return Ok(ids);
        }
        number += 1;
    }
}
