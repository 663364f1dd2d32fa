use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::error::ServiceError;
use crate::models::book::Category;

/// Lifecycle state of a borrow. Corresponds to the `borrow_status` SQL enum.
///
/// ```text
/// pending ──approve──> progress ──return──> closed
///    └─────reject────> rejected
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "borrow_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    /// Requested by a user, awaiting an admin decision. Stock untouched.
    Pending,
    /// Approved and on loan. One copy has been taken out of stock.
    Progress,
    /// Returned. Terminal.
    Closed,
    /// Declined by an admin. Terminal.
    Rejected,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Pending => "pending",
            BorrowStatus::Progress => "progress",
            BorrowStatus::Closed => "closed",
            BorrowStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BorrowStatus::Closed | BorrowStatus::Rejected)
    }

    /// Resolves which transition moving from `self` to `target` performs.
    ///
    /// Terminal states never move. The three designed edges carry side effects;
    /// any other target from a non-terminal state is a plain status overwrite.
    pub fn transition_to(self, target: BorrowStatus) -> Result<Transition, ServiceError> {
        if self.is_terminal() {
            return Err(ServiceError::TerminalStatus(self));
        }
        Ok(match (self, target) {
            (BorrowStatus::Pending, BorrowStatus::Rejected) => Transition::Reject,
            (BorrowStatus::Pending, BorrowStatus::Progress) => Transition::Approve,
            (BorrowStatus::Progress, BorrowStatus::Closed) => Transition::Close,
            _ => Transition::Overwrite(target),
        })
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The edge a status change takes through the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Reject,
    Approve,
    Close,
    Overwrite(BorrowStatus),
}

impl Transition {
    /// Net change applied to the book's stock.
    pub fn stock_delta(&self) -> i32 {
        match self {
            Transition::Approve => -1,
            Transition::Close => 1,
            Transition::Reject | Transition::Overwrite(_) => 0,
        }
    }

    pub fn target(&self) -> BorrowStatus {
        match self {
            Transition::Reject => BorrowStatus::Rejected,
            Transition::Approve => BorrowStatus::Progress,
            Transition::Close => BorrowStatus::Closed,
            Transition::Overwrite(status) => *status,
        }
    }
}

/// A borrow row.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Borrow {
    pub borrow_id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    /// Late fee in whole currency units.
    pub fine: i64,
}

/// Payload for `POST /borrows`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub book_id: i32,
}

/// Payload for `PATCH /borrows/{id}/status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: BorrowStatus,
}

/// Outcome of a status change. `fine` is only set when the borrow was closed.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatusChange {
    pub borrow: Borrow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fine: Option<i64>,
}

/// Admin borrow table row, denormalized with user and book details.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct AdminBorrowRow {
    pub borrow_id: i32,
    pub user_id: i32,
    pub username: String,
    pub user_image: Option<String>,
    pub book_id: i32,
    pub book_name: String,
    pub book_image: Option<String>,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub fine: i64,
    /// Active and past its due date at query time.
    pub is_overdue: bool,
}

/// Filters for the admin borrow table.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AdminBorrowQuery {
    pub status: Option<BorrowStatus>,
    /// Case-insensitive match on username, book name or borrow id.
    pub search: Option<String>,
    /// `true` keeps only overdue active borrows, `false` only the rest.
    pub overdue: Option<bool>,
}

/// A user's own borrow history row.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct UserBorrowRow {
    pub borrow_id: i32,
    pub book_id: i32,
    pub book_name: String,
    pub book_image: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub category: Category,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub fine: i64,
}

/// Flat, human-labelled row handed to the spreadsheet sink.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExportRow {
    #[serde(rename = "Borrow ID")]
    pub borrow_id: i32,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Book Name")]
    pub book_name: String,
    #[serde(rename = "Author")]
    pub author: Option<String>,
    #[serde(rename = "Borrow Date")]
    pub borrow_date: String,
    #[serde(rename = "Due Date")]
    pub due_date: String,
    #[serde(rename = "Return Date")]
    pub return_date: Option<String>,
    #[serde(rename = "Status")]
    pub status: BorrowStatus,
    #[serde(rename = "Fine")]
    pub fine: String,
}

/// Admin dashboard counters.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, FromRow)]
pub struct BorrowSummary {
    pub total: i64,
    pub pending: i64,
    pub progress: i64,
    pub closed: i64,
    pub rejected: i64,
    pub overdue: i64,
    pub total_fines: i64,
}

/// User dashboard counters.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, FromRow)]
pub struct UserStats {
    pub active_borrows: i64,
    pub completed_borrows: i64,
    pub available_books: i64,
}
