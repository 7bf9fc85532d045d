//! Authentication service.
//!
//! Provides password registration and login.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use bookstore_core::{Email, RoleName};

use crate::db::{RepositoryError, UserRepository};
use crate::models::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum password length.
const MAX_PASSWORD_LENGTH: usize = 20;

/// Details submitted to create an account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub repeat_password: String,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: String,
}

/// Authentication service.
///
/// Handles user registration and login.
pub struct AuthService<'a, S> {
    users: &'a S,
}

impl<'a, S: UserRepository> AuthService<'a, S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a S) -> Self {
        Self { users }
    }

    /// Register a new customer account.
    ///
    /// The account gets the `USER` role and an empty shopping cart.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::Validation` if a name or the address is blank.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<User, AuthError> {
        let email = Email::parse(&registration.email)?;
        validate_password(&registration.password, &registration.repeat_password)?;
        let first_name = required(&registration.first_name, "firstName")?;
        let last_name = required(&registration.last_name, "lastName")?;
        let shipping_address = required(&registration.shipping_address, "shippingAddress")?;

        let password_hash = hash_password(&registration.password)?;

        let user = self
            .users
            .create_user(&NewUser {
                email,
                password_hash,
                first_name,
                last_name,
                shipping_address,
                role: RoleName::User,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .find_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

fn required(value: &str, field: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::Validation(format!("{field} must not be blank")));
    }
    Ok(value.to_owned())
}

/// Validate password meets requirements.
fn validate_password(password: &str, repeat: &str) -> Result<(), AuthError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        return Err(AuthError::WeakPassword(format!(
            "password must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    if password != repeat {
        return Err(AuthError::WeakPassword(
            "passwords do not match".to_owned(),
        ));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{CartRepository, MemoryStore};

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.to_owned(),
            password: "hunter22".to_owned(),
            repeat_password: "hunter22".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            shipping_address: "1 Analytical Way".to_owned(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("12345", "12345").is_err());
        assert!(validate_password(&"x".repeat(21), &"x".repeat(21)).is_err());
        assert!(validate_password("123456", "123457").is_err());
        assert!(validate_password("123456", "123456").is_ok());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let user = auth.register(&registration("Ada@Example.com")).await.unwrap();
        assert_eq!(user.email.as_str(), "ada@example.com");
        assert!(user.has_role(RoleName::User));
        assert!(store.find_cart(user.id).await.unwrap().is_some());

        let logged_in = auth.login("ada@example.com", "hunter22").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(matches!(
            auth.login("ada@example.com", "wrong-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "hunter22").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.register(&registration("ada@example.com")).await.unwrap();
        assert!(matches!(
            auth.register(&registration("ada@example.com")).await,
            Err(AuthError::UserAlreadyExists)
        ));
    }
}
