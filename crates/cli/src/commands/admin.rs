//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! bookstore-cli admin create -e admin@example.com -p s3cret! --first-name Ada --last-name Admin
//! ```
//!
//! Admin accounts hold the `ADMIN` role: they manage books and categories and
//! advance order statuses. Registration over HTTP only ever creates `USER`s.

use thiserror::Error;

use bookstore_core::{Email, RoleName};
use bookstore_storefront::db::{PgStore, RepositoryError, UserRepository};
use bookstore_storefront::models::NewUser;
use bookstore_storefront::services::auth::{AuthError, hash_password};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] bookstore_core::EmailError),

    /// Password rejected.
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Details for a new admin account.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

fn validate(account: &AdminAccount) -> Result<Email, AdminError> {
    let email = Email::parse(&account.email)?;
    let len = account.password.chars().count();
    if !(6..=20).contains(&len) {
        return Err(AdminError::InvalidPassword(
            "must be between 6 and 20 characters".to_owned(),
        ));
    }
    Ok(email)
}

/// Create a new admin account with its cart.
///
/// # Errors
///
/// Returns an error if the input is invalid, the email is taken or the
/// database is unreachable.
pub async fn create_user(account: &AdminAccount) -> Result<(), Box<dyn std::error::Error>> {
    let email = validate(account)?;
    let store = PgStore::new(super::connect().await?);

    tracing::info!("Creating admin user: {}", email);

    let user = store
        .create_user(&NewUser {
            email: email.clone(),
            password_hash: hash_password(&account.password).map_err(AdminError::from)?,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            shipping_address: account.address.clone(),
            role: RoleName::Admin,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn account(email: &str, password: &str) -> AdminAccount {
        AdminAccount {
            email: email.to_owned(),
            password: password.to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Admin".to_owned(),
            address: "n/a".to_owned(),
        }
    }

    #[test]
    fn test_validate_accepts_good_input() {
        let email = validate(&account("Admin@Example.com", "s3cret!")).unwrap();
        assert_eq!(email.as_str(), "admin@example.com");
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(matches!(
            validate(&account("not-an-email", "s3cret!")),
            Err(AdminError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate(&account("admin@example.com", "short")),
            Err(AdminError::InvalidPassword(_))
        ));
    }
}
