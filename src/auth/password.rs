use crate::error::AppError;
use bcrypt::{hash, verify, BcryptError};

/// Work factor for stored credential hashes.
pub const BCRYPT_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks a login attempt against a stored hash.
///
/// A stored value that is not a bcrypt hash at all counts as a mismatch, so a
/// corrupt credential row rejects the login instead of failing the request.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    match verify(password, stored_hash) {
        Ok(matches) => Ok(matches),
        Err(BcryptError::InvalidHash(_))
        | Err(BcryptError::InvalidPrefix(_))
        | Err(BcryptError::InvalidCost(_)) => {
            log::warn!("stored credential is not a valid bcrypt hash");
            Ok(false)
        }
        Err(e) => Err(AppError::InternalServerError(format!(
            "Failed to verify password: {}",
            e
        ))),
    }
}
