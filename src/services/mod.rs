//! Library domain services. Each holds a handle to the connection pool it was
//! built with; nothing here keeps state between requests.

pub mod bookmarks;
pub mod borrows;
pub mod catalog;
pub mod messages;
pub mod notifications;
pub mod policy;
pub mod projections;
pub mod users;

pub use bookmarks::BookmarkService;
pub use borrows::BorrowService;
pub use catalog::CatalogService;
pub use notifications::NotificationService;
pub use projections::ProjectionService;
pub use users::UserService;

use validator::Validate;

use crate::error::ServiceError;

pub(crate) fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))
}

/// Turns user search text into a `%substring%` pattern for `LIKE ... ESCAPE '\'`,
/// so `%`, `_` and `\` in the text match themselves.
pub(crate) fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("dune"), "%dune%");
        assert_eq!(like_pattern("_"), "%\\_%");
        assert_eq!(like_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
        assert_eq!(like_pattern(""), "%%");
    }
}
