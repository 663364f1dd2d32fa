//!
//! # Error Handling
//!
//! Two layers of errors live here.
//!
//! `ServiceError` is what the services (borrow engine, notifications, bookmarks,
//! catalog, accounts) return. It classifies failures into the library's own taxonomy:
//! missing records, business-rule violations such as an empty shelf, missing
//! capabilities, invalid input and raw database failures. Driver errors are
//! classified on the way in (`From<sqlx::Error>`), so a unique-index hit on the
//! active-borrow index surfaces as `DuplicateActiveBorrow` rather than a 500.
//!
//! `AppError` is the HTTP-facing type. It implements `actix_web::error::ResponseError`
//! so handlers can return `Result<impl Responder, AppError>` and use `?` throughout.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::BorrowStatus;

/// Name of the partial unique index guarding one active borrow per (user, book).
pub const ACTIVE_BORROW_INDEX: &str = "borrows_one_active_per_user_book";

/// Failures raised by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The named record does not exist (or is not visible to the caller).
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A borrow was requested for a book with no copies in stock.
    #[error("Book not available")]
    OutOfStock,
    /// Approval found the shelf empty; the borrow stays `pending`.
    #[error("Book no longer available")]
    BookUnavailable,
    #[error("An active borrow for this book already exists")]
    DuplicateActiveBorrow,
    #[error("Borrow is already {0} and its status can no longer change")]
    TerminalStatus(BorrowStatus),
    #[error("{0}")]
    Conflict(String),
    #[error("Admin role required")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Internal(String),
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl ServiceError {
    /// True for rule violations a client can act on (rendered as `{success: false, message}`).
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            ServiceError::OutOfStock
                | ServiceError::BookUnavailable
                | ServiceError::DuplicateActiveBorrow
                | ServiceError::TerminalStatus(_)
                | ServiceError::Conflict(_)
        )
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(error: sqlx::Error) -> ServiceError {
        if let sqlx::Error::RowNotFound = error {
            return ServiceError::NotFound("Record");
        }
        if let Some(db_error) = error.as_database_error() {
            if db_error.is_unique_violation() {
                if db_error.constraint() == Some(ACTIVE_BORROW_INDEX) {
                    return ServiceError::DuplicateActiveBorrow;
                }
                return ServiceError::Conflict("Record already exists".into());
            }
            if db_error.is_foreign_key_violation() {
                return ServiceError::NotFound("Referenced record");
            }
            if db_error.is_check_violation() {
                return ServiceError::Validation(db_error.message().to_string());
            }
        }
        ServiceError::Database(error)
    }
}

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error, often carrying a message
/// detailing the issue. These errors are then converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    Unauthorized(String),
    /// Authenticated, but the role does not allow the operation (HTTP 403).
    Forbidden(String),
    /// Malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Requested resource was not found (HTTP 404).
    NotFound(String),
    /// A library rule rejected the operation, e.g. an out-of-stock borrow (HTTP 409).
    Conflict(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Failed input validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({
                "error": msg
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(json!({
                "success": false,
                "message": msg
            })),
            AppError::InternalServerError(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": msg
                }))
            }
            // Database details stay in the log.
            AppError::DatabaseError(msg) => {
                log::error!("database error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Database error"
                }))
            }
            AppError::ValidationError(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(error: ServiceError) -> AppError {
        match error {
            ServiceError::NotFound(_) => AppError::NotFound(error.to_string()),
            ServiceError::Forbidden => AppError::Forbidden(error.to_string()),
            ServiceError::Validation(msg) => AppError::ValidationError(msg),
            ServiceError::Internal(msg) => AppError::InternalServerError(msg),
            ServiceError::Database(e) => AppError::DatabaseError(e.to_string()),
            other if other.is_business_rule() => AppError::Conflict(other.to_string()),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; everything else
/// becomes `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// JWT processing failures are authentication failures.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
