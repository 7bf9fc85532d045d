//! Account queries.

use tracing::instrument;

use bookstore_core::{Email, RoleId, UserId};

use super::{PgStore, fetch_user};
use crate::db::{RepositoryError, UserRepository, conflict_on_unique};
use crate::models::{NewUser, User};

impl UserRepository for PgStore {
    #[instrument(skip(self))]
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, id).await
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        // Using runtime query to avoid SQLx offline mode cache requirements
        let row: Option<(UserId, String)> = sqlx::query_as(
            r"
            SELECT id, password_hash
            FROM bookstore.user
            WHERE email = $1 AND NOT is_deleted
            ",
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;

        let Some((id, password_hash)) = row else {
            return Ok(None);
        };

        let user = fetch_user(&mut conn, id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(Some((user, password_hash)))
    }

    #[instrument(skip(self, user), fields(email = %user.email, role = %user.role))]
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Using runtime query to avoid SQLx offline mode cache requirements
        let id: UserId = sqlx::query_scalar(
            r"
            INSERT INTO bookstore.user
                (email, password_hash, first_name, last_name, shipping_address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.shipping_address)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        // Fetch-or-create the role row; the no-op update makes RETURNING
        // yield the existing id on conflict.
        let role_id: RoleId = sqlx::query_scalar(
            r"
            INSERT INTO bookstore.role (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            ",
        )
        .bind(user.role)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO bookstore.user_role (user_id, role_id) VALUES ($1, $2)")
            .bind(id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO bookstore.shopping_cart (user_id) VALUES ($1)")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let created = fetch_user(&mut tx, id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(created)
    }
}
