//! Database migration command.
//!
//! Applies every pending migration from `crates/storefront/migrations/`.
//!
//! # Environment Variables
//!
//! - `BOOKSTORE_DATABASE_URL` - `PostgreSQL` connection string (or `DATABASE_URL`)

/// Run pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running bookstore migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
