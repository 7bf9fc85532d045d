//! Category queries.

use tracing::instrument;

use bookstore_core::CategoryId;

use super::PgStore;
use crate::db::{CategoryRepository, Page, RepositoryError};
use crate::models::{Category, NewCategory};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

impl CategoryRepository for PgStore {
    #[instrument(skip(self))]
    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, description
            FROM bookstore.category
            WHERE id = $1 AND NOT is_deleted
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    #[instrument(skip(self))]
    async fn list_categories(&self, page: Page) -> Result<Vec<Category>, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, description
            FROM bookstore.category
            WHERE NOT is_deleted
            ORDER BY id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self, category), fields(name = %category.name))]
    async fn insert_category(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO bookstore.category (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            ",
        )
        .bind(&category.name)
        .bind(category.description.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self, category))]
    async fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Option<Category>, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            UPDATE bookstore.category
            SET name = $2, description = $3
            WHERE id = $1 AND NOT is_deleted
            RETURNING id, name, description
            ",
        )
        .bind(id)
        .bind(&category.name)
        .bind(category.description.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let result = sqlx::query(
            "UPDATE bookstore.category SET is_deleted = TRUE WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
