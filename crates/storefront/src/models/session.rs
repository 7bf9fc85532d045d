//! Session-related types.
//!
//! Types stored in the session for authentication state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use bookstore_core::{Email, RoleName, UserId};

use super::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Roles held when the session was created.
    pub roles: BTreeSet<RoleName>,
}

impl CurrentUser {
    /// Returns `true` if the user may manage the catalogue and orders.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&RoleName::Admin)
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
