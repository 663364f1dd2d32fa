use sqlx::{PgConnection, PgPool};

use crate::error::ServiceError;
use crate::models::{Caller, Notification, NotificationKind};

/// How many notifications a listing returns.
pub const LIST_LIMIT: i64 = 50;

/// Inserts one unread notification for `user_id`.
///
/// Takes a connection rather than the pool so callers can write the notification
/// inside the same transaction as the change it reports.
pub async fn notify(
    conn: &mut PgConnection,
    user_id: i32,
    message: &str,
    kind: NotificationKind,
) -> Result<(), ServiceError> {
    sqlx::query("INSERT INTO notifications (user_id, message, type) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(message)
        .bind(kind)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Writes one notification per admin, skipping `exclude_user_id`. Returns the number written.
pub async fn notify_all_admins(
    conn: &mut PgConnection,
    message: &str,
    kind: NotificationKind,
    exclude_user_id: Option<i32>,
) -> Result<u64, ServiceError> {
    let result = sqlx::query(
        "INSERT INTO notifications (user_id, message, type)
         SELECT user_id, $1, $2 FROM users
         WHERE role = 'admin' AND ($3::INTEGER IS NULL OR user_id <> $3)",
    )
    .bind(message)
    .bind(kind)
    .bind(exclude_user_id)
    .execute(&mut *conn)
    .await?;

    log::debug!(
        "admin fan-out wrote {} notification(s) (excluded: {:?})",
        result.rows_affected(),
        exclude_user_id
    );
    Ok(result.rows_affected())
}

/// A user's inbox: listing, read flags, deletion and the unread badge.
#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Newest first, capped at `LIST_LIMIT`.
    pub async fn list(&self, caller: &Caller) -> Result<Vec<Notification>, ServiceError> {
        let rows = sqlx::query_as::<_, Notification>(
            "SELECT notification_id, user_id, message, type, is_read, created_at
             FROM notifications WHERE user_id = $1
             ORDER BY created_at DESC, notification_id DESC
             LIMIT $2",
        )
        .bind(caller.user_id)
        .bind(LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn unread_count(&self, caller: &Caller) -> Result<i64, ServiceError> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(caller.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn mark_read(&self, caller: &Caller, notification_id: i32) -> Result<(), ServiceError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE notification_id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(caller.user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Notification"));
        }
        Ok(())
    }

    /// Returns how many notifications flipped to read.
    pub async fn mark_all_read(&self, caller: &Caller) -> Result<u64, ServiceError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(caller.user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, caller: &Caller, notification_id: i32) -> Result<(), ServiceError> {
        let result =
            sqlx::query("DELETE FROM notifications WHERE notification_id = $1 AND user_id = $2")
                .bind(notification_id)
                .bind(caller.user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Notification"));
        }
        Ok(())
    }
}
