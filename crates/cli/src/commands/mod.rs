//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Database URL from `BOOKSTORE_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();

    std::env::var("BOOKSTORE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "BOOKSTORE_DATABASE_URL not set")
}

/// Connect to the bookstore database.
async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let url = database_url()?;
    tracing::info!("Connecting to bookstore database...");
    Ok(bookstore_storefront::db::create_pool(&url).await?)
}
