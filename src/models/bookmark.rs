use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::book::Book;

/// A bookmarked catalog entry together with when it was bookmarked.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct BookmarkedBook {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub book: Book,
    pub bookmarked_at: DateTime<Utc>,
}
