//! Session middleware configuration.
//!
//! Sessions are stored in `PostgreSQL` (`tower_sessions.session`) and
//! identified by a cookie.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::BookstoreConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bookstore_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over `store`.
///
/// Production passes a `PostgresStore`; router tests pass a `MemoryStore`.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &BookstoreConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
