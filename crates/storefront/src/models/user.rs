//! User account types.

use std::collections::BTreeSet;

use bookstore_core::{Email, RoleName, UserId};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Default shipping address given at registration.
    pub shipping_address: String,
    pub roles: BTreeSet<RoleName>,
}

impl User {
    /// Returns `true` if the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }
}

/// A validated registration, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: String,
    /// Role granted at creation; fetched or created in the role table.
    pub role: RoleName,
}
