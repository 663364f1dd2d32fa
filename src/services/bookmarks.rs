use sqlx::PgPool;

use super::messages;
use super::notifications::notify;
use crate::error::ServiceError;
use crate::models::{BookmarkedBook, Caller, NotificationKind};

#[derive(Clone)]
pub struct BookmarkService {
    pool: PgPool,
}

impl BookmarkService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bookmarks a book. Adding an existing bookmark is a no-op; the confirmation
    /// notification is only sent when a row was actually created.
    ///
    /// Returns whether a new bookmark was created.
    pub async fn add(&self, caller: &Caller, book_id: i32) -> Result<bool, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let (book_name,) = sqlx::query_as::<_, (String,)>("SELECT name FROM books WHERE book_id = $1")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ServiceError::NotFound("Book"))?;

        let inserted = sqlx::query(
            "INSERT INTO bookmarks (user_id, book_id) VALUES ($1, $2)
             ON CONFLICT (user_id, book_id) DO NOTHING",
        )
        .bind(caller.user_id)
        .bind(book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            notify(
                &mut tx,
                caller.user_id,
                &messages::bookmark_added(&book_name),
                NotificationKind::Bookmark,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Removes a bookmark if present. Returns whether one was removed.
    pub async fn remove(&self, caller: &Caller, book_id: i32) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND book_id = $2")
            .bind(caller.user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The caller's bookmarks, newest first.
    pub async fn list(&self, caller: &Caller) -> Result<Vec<BookmarkedBook>, ServiceError> {
        let rows = sqlx::query_as::<_, BookmarkedBook>(
            "SELECT b.book_id, b.name, b.author, b.publisher, b.description, b.category,
                    b.year_published, b.stock, b.image, b.created_at,
                    bm.created_at AS bookmarked_at
             FROM bookmarks bm
             JOIN books b ON bm.book_id = b.book_id
             WHERE bm.user_id = $1
             ORDER BY bm.created_at DESC",
        )
        .bind(caller.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn is_bookmarked(&self, caller: &Caller, book_id: i32) -> Result<bool, ServiceError> {
        let (exists,) = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS (SELECT 1 FROM bookmarks WHERE user_id = $1 AND book_id = $2)",
        )
        .bind(caller.user_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
