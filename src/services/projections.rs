//! Read models over borrows for dashboards and export.
//!
//! All projections inner-join borrows with their user and book: a borrow whose
//! user or book has been deleted drops out instead of showing up half-empty.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::like_pattern;
use super::policy::{format_export_date, format_rupiah};
use crate::error::ServiceError;
use crate::models::{
    AdminBorrowQuery, AdminBorrowRow, BorrowStatus, BorrowSummary, Caller, ExportRow,
    UserBorrowRow, UserStats,
};

const OVERDUE_EXPR: &str = "(b.status IN ('pending', 'progress') AND b.due_date < NOW())";

#[derive(Debug, FromRow)]
struct ExportSource {
    borrow_id: i32,
    username: String,
    book_name: String,
    author: Option<String>,
    borrow_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
    status: BorrowStatus,
    fine: i64,
}

impl From<ExportSource> for ExportRow {
    fn from(row: ExportSource) -> Self {
        ExportRow {
            borrow_id: row.borrow_id,
            username: row.username,
            book_name: row.book_name,
            author: row.author,
            borrow_date: format_export_date(row.borrow_date),
            due_date: format_export_date(row.due_date),
            return_date: row.return_date.map(format_export_date),
            status: row.status,
            fine: format_rupiah(row.fine),
        }
    }
}

#[derive(Clone)]
pub struct ProjectionService {
    pool: PgPool,
}

impl ProjectionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Admin borrow table, newest first, with optional status/search/overdue filters.
    pub async fn all_borrows(
        &self,
        caller: &Caller,
        filter: &AdminBorrowQuery,
    ) -> Result<Vec<AdminBorrowRow>, ServiceError> {
        caller.require_admin()?;

        let mut sql = format!(
            "SELECT b.borrow_id, b.user_id, u.username, u.image AS user_image,
                    b.book_id, bo.name AS book_name, bo.image AS book_image,
                    b.borrow_date, b.due_date, b.return_date, b.status, b.fine,
                    {} AS is_overdue
             FROM borrows b
             JOIN users u ON b.user_id = u.user_id
             JOIN books bo ON b.book_id = bo.book_id",
            OVERDUE_EXPR
        );

        let mut conditions: Vec<String> = Vec::new();
        let mut param_count = 1;

        if filter.status.is_some() {
            conditions.push(format!("b.status = ${}", param_count));
            param_count += 1;
        }
        if filter.search.is_some() {
            conditions.push(format!(
                "(u.username ILIKE ${0} ESCAPE '\\' OR bo.name ILIKE ${0} ESCAPE '\\' OR b.borrow_id::TEXT LIKE ${0} ESCAPE '\\')",
                param_count
            ));
        }
        match filter.overdue {
            Some(true) => conditions.push(OVERDUE_EXPR.to_string()),
            Some(false) => conditions.push(format!("NOT {}", OVERDUE_EXPR)),
            None => {}
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY b.borrow_id DESC");

        let mut query = sqlx::query_as::<_, AdminBorrowRow>(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(search) = &filter.search {
            query = query.bind(like_pattern(search));
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// The caller's own borrow history, newest first.
    pub async fn user_borrows(&self, caller: &Caller) -> Result<Vec<UserBorrowRow>, ServiceError> {
        let rows = sqlx::query_as::<_, UserBorrowRow>(
            "SELECT b.borrow_id, b.book_id, bo.name AS book_name, bo.image AS book_image,
                    bo.author, bo.publisher, bo.category,
                    b.borrow_date, b.due_date, b.return_date, b.status, b.fine
             FROM borrows b
             JOIN books bo ON b.book_id = bo.book_id
             WHERE b.user_id = $1
             ORDER BY b.borrow_id DESC",
        )
        .bind(caller.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Flat rows for the spreadsheet sink.
    pub async fn export_rows(&self, caller: &Caller) -> Result<Vec<ExportRow>, ServiceError> {
        caller.require_admin()?;

        let rows = sqlx::query_as::<_, ExportSource>(
            "SELECT b.borrow_id, u.username, bo.name AS book_name, bo.author,
                    b.borrow_date, b.due_date, b.return_date, b.status, b.fine
             FROM borrows b
             JOIN users u ON b.user_id = u.user_id
             JOIN books bo ON b.book_id = bo.book_id
             ORDER BY b.borrow_id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ExportRow::from).collect())
    }

    pub async fn borrow_summary(&self, caller: &Caller) -> Result<BorrowSummary, ServiceError> {
        caller.require_admin()?;

        let summary = sqlx::query_as::<_, BorrowSummary>(&format!(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE b.status = 'pending') AS pending,
                    COUNT(*) FILTER (WHERE b.status = 'progress') AS progress,
                    COUNT(*) FILTER (WHERE b.status = 'closed') AS closed,
                    COUNT(*) FILTER (WHERE b.status = 'rejected') AS rejected,
                    COUNT(*) FILTER (WHERE {}) AS overdue,
                    COALESCE(SUM(b.fine), 0)::BIGINT AS total_fines
             FROM borrows b
             JOIN users u ON b.user_id = u.user_id
             JOIN books bo ON b.book_id = bo.book_id",
            OVERDUE_EXPR
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }

    pub async fn user_stats(&self, caller: &Caller) -> Result<UserStats, ServiceError> {
        let stats = sqlx::query_as::<_, UserStats>(
            "SELECT
                (SELECT COUNT(*) FROM borrows b JOIN books bo ON b.book_id = bo.book_id
                 WHERE b.user_id = $1 AND b.status IN ('pending', 'progress')) AS active_borrows,
                (SELECT COUNT(*) FROM borrows b JOIN books bo ON b.book_id = bo.book_id
                 WHERE b.user_id = $1 AND b.status = 'closed') AS completed_borrows,
                (SELECT COUNT(*) FROM books WHERE stock > 0) AS available_books",
        )
        .bind(caller.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
