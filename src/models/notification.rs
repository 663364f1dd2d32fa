use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// What a notification is about. Corresponds to the `notification_type` SQL enum.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Borrow,
    Return,
    Fine,
    Bookmark,
    AdminAlert,
    #[default]
    General,
}

/// A message addressed to exactly one user.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Notification {
    pub notification_id: i32,
    pub user_id: i32,
    pub message: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
