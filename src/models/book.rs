use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    static ref YEAR_REGEX: regex::Regex = regex::Regex::new(r"^\d{4}$").unwrap();
}

/// Catalog category. Corresponds to the `book_category` SQL enum.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "book_category", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Fiction,
    NonFiction,
    Science,
    Technology,
    History,
    Biography,
    Children,
    Education,
    Reference,
    #[default]
    Other,
}

/// A catalog entry. `stock` is the authoritative count of loanable copies.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Book {
    pub book_id: i32,
    pub name: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub category: Category,
    pub year_published: Option<String>,
    pub stock: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input structure for creating or updating a book.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BookInput {
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(max = 255))]
    pub author: Option<String>,

    #[validate(length(max = 255))]
    pub publisher: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub category: Category,

    /// Four-digit year, e.g. `"1999"`.
    #[validate(regex(path = "YEAR_REGEX", message = "Year must be 4 digits"))]
    pub year_published: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,

    /// Reference returned by the external file store.
    pub image: Option<String>,
}

/// Query parameters for browsing the catalog.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BookQuery {
    /// Case-insensitive match against name or author.
    pub search: Option<String>,
    pub category: Option<Category>,
}
