use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::ServiceError;

/// Account role. Corresponds to the `user_role` SQL enum.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular patron: may browse, borrow, bookmark.
    #[default]
    User,
    /// Back-office operator: approves borrows and manages the catalog and accounts.
    Admin,
}

/// The identity an operation runs on behalf of.
///
/// Built from verified token claims by the `AuthenticatedUser` extractor and passed
/// explicitly into every service call, so capability checks live next to the mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with `ServiceError::Forbidden` unless the caller holds the admin role.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

/// A user account as returned by the API. The password hash never leaves the database layer.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Admin payload for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String, // hashed before storage, never persisted as-is
    #[serde(default)]
    pub role: Role,
    /// Reference returned by the external file store.
    pub image: Option<String>,
}

/// Admin payload for editing an existing account.
#[derive(Debug, Deserialize, Validate)]
pub struct UserUpdateInput {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub role: Role,
    pub image: Option<String>,
}

/// Self-service profile edit.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileInput {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    pub image: Option<String>,
}
