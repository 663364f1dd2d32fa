//! Credentials sign-in and bearer-token plumbing.
//!
//! Accounts are created by admins (see `UserService::create`); this module only
//! signs existing accounts in and checks the token on every `/api` request.

pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Role, User};

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Email and password sign-in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "Email and password required"))]
    pub password: String,
}

/// The identity a client keeps for the session: who is signed in, under which
/// role, and what to show in the navigation (name and avatar).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub image: Option<String>,
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        SessionUser {
            id: user.user_id,
            email: user.email,
            username: user.username,
            role: user.role,
            image: user.image,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user: SessionUser,
}
