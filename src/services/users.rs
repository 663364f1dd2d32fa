use sqlx::PgPool;

use super::validate_input;
use crate::auth::hash_password;
use crate::error::ServiceError;
use crate::models::{Caller, ProfileInput, User, UserInput, UserUpdateInput};

const USER_COLUMNS: &str = "user_id, username, email, role, image, created_at";

/// Account administration and self-service profile edits.
#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All accounts, newest first.
    pub async fn list(&self, caller: &Caller) -> Result<Vec<User>, ServiceError> {
        caller.require_admin()?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY user_id DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn create(&self, caller: &Caller, input: &UserInput) -> Result<User, ServiceError> {
        caller.require_admin()?;
        validate_input(input)?;

        let password_hash = hash_password(&input.password)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, role, image)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&input.username)
        .bind(&input.email)
        .bind(password_hash)
        .bind(input.role)
        .bind(&input.image)
        .fetch_one(&self.pool)
        .await
        .map_err(email_conflict)?;

        log::info!(
            "user {} created with role {:?} by admin {}",
            user.user_id,
            user.role,
            caller.user_id
        );
        Ok(user)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        user_id: i32,
        input: &UserUpdateInput,
    ) -> Result<User, ServiceError> {
        caller.require_admin()?;
        validate_input(input)?;

        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET username = $1, email = $2, role = $3, image = $4
             WHERE user_id = $5
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&input.username)
        .bind(&input.email)
        .bind(input.role)
        .bind(&input.image)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(email_conflict)?
        .ok_or(ServiceError::NotFound("User"))
    }

    pub async fn delete(&self, caller: &Caller, user_id: i32) -> Result<(), ServiceError> {
        caller.require_admin()?;

        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("User"));
        }
        log::info!("user {} deleted by admin {}", user_id, caller.user_id);
        Ok(())
    }

    pub async fn profile(&self, caller: &Caller) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS))
            .bind(caller.user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServiceError::NotFound("User"))
    }

    /// Updates the caller's own username and avatar reference.
    pub async fn update_profile(
        &self,
        caller: &Caller,
        input: &ProfileInput,
    ) -> Result<User, ServiceError> {
        validate_input(input)?;

        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET username = $1, image = $2 WHERE user_id = $3 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&input.username)
        .bind(&input.image)
        .bind(caller.user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ServiceError::NotFound("User"))
    }
}

fn email_conflict(error: sqlx::Error) -> ServiceError {
    match ServiceError::from(error) {
        ServiceError::Conflict(_) => ServiceError::Conflict("Email already registered".into()),
        other => other,
    }
}
