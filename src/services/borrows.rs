//! Borrow lifecycle engine.
//!
//! Every operation runs inside a single transaction: the book and borrow rows are
//! locked, the stock check, stock mutation, status update and the notifications
//! describing them commit together or not at all.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use super::notifications::{notify, notify_all_admins};
use super::{messages, policy};
use crate::error::ServiceError;
use crate::models::{Borrow, BorrowStatus, Caller, NotificationKind, StatusChange, Transition};

const BORROW_COLUMNS: &str =
    "borrow_id, user_id, book_id, borrow_date, due_date, return_date, status, fine";

/// Everything a status change needs, read under lock in one round trip.
#[derive(Debug, FromRow)]
struct BorrowContext {
    borrow_id: i32,
    user_id: i32,
    book_id: i32,
    due_date: DateTime<Utc>,
    status: BorrowStatus,
    book_name: String,
    stock: i32,
    username: String,
}

#[derive(Clone)]
pub struct BorrowService {
    pool: PgPool,
}

impl BorrowService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Files a `pending` borrow for the caller. Stock is only reserved on approval.
    pub async fn request_borrow(&self, caller: &Caller, book_id: i32) -> Result<Borrow, ServiceError> {
        self.request_borrow_at(caller, book_id, Utc::now()).await
    }

    pub async fn request_borrow_at(
        &self,
        caller: &Caller,
        book_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Borrow, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let (book_name, stock) = sqlx::query_as::<_, (String, i32)>(
            "SELECT name, stock FROM books WHERE book_id = $1 FOR SHARE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::NotFound("Book"))?;

        if stock <= 0 {
            return Err(ServiceError::OutOfStock);
        }

        let (username,) =
            sqlx::query_as::<_, (String,)>("SELECT username FROM users WHERE user_id = $1")
                .bind(caller.user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(ServiceError::NotFound("User"))?;

        let (already_active,) = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS (
                SELECT 1 FROM borrows
                WHERE user_id = $1 AND book_id = $2 AND status IN ('pending', 'progress')
             )",
        )
        .bind(caller.user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_active {
            return Err(ServiceError::DuplicateActiveBorrow);
        }

        let borrow = sqlx::query_as::<_, Borrow>(&format!(
            "INSERT INTO borrows (user_id, book_id, borrow_date, due_date, status, fine)
             VALUES ($1, $2, $3, $4, 'pending', 0)
             RETURNING {}",
            BORROW_COLUMNS
        ))
        .bind(caller.user_id)
        .bind(book_id)
        .bind(now)
        .bind(policy::due_date_for(now))
        .fetch_one(&mut *tx)
        .await?;

        notify(
            &mut tx,
            caller.user_id,
            &messages::borrow_pending(&book_name),
            NotificationKind::Borrow,
        )
        .await?;
        notify_all_admins(
            &mut tx,
            &messages::admin_new_request(&username, &book_name),
            NotificationKind::AdminAlert,
            Some(caller.user_id),
        )
        .await?;

        tx.commit().await?;

        log::info!(
            "borrow {} requested by user {} for book {}",
            borrow.borrow_id,
            caller.user_id,
            book_id
        );
        Ok(borrow)
    }

    /// Moves a borrow through its lifecycle. Admin only.
    pub async fn change_status(
        &self,
        caller: &Caller,
        borrow_id: i32,
        target: BorrowStatus,
    ) -> Result<StatusChange, ServiceError> {
        self.change_status_at(caller, borrow_id, target, Utc::now())
            .await
    }

    pub async fn change_status_at(
        &self,
        caller: &Caller,
        borrow_id: i32,
        target: BorrowStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, ServiceError> {
        caller.require_admin()?;

        let mut tx = self.pool.begin().await?;

        let ctx = sqlx::query_as::<_, BorrowContext>(
            "SELECT b.borrow_id, b.user_id, b.book_id, b.due_date, b.status,
                    bo.name AS book_name, bo.stock, u.username
             FROM borrows b
             JOIN books bo ON b.book_id = bo.book_id
             JOIN users u ON b.user_id = u.user_id
             WHERE b.borrow_id = $1
             FOR UPDATE OF b, bo",
        )
        .bind(borrow_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::NotFound("Borrow"))?;

        let transition = ctx.status.transition_to(target)?;

        let change = match transition {
            Transition::Reject => {
                let borrow = set_status(&mut tx, ctx.borrow_id, transition.target()).await?;
                notify(
                    &mut tx,
                    ctx.user_id,
                    &messages::borrow_rejected(&ctx.book_name),
                    NotificationKind::Borrow,
                )
                .await?;
                notify_all_admins(
                    &mut tx,
                    &messages::admin_rejected(&ctx.username, &ctx.book_name),
                    NotificationKind::AdminAlert,
                    Some(ctx.user_id),
                )
                .await?;
                StatusChange { borrow, fine: None }
            }
            Transition::Approve => {
                if ctx.stock <= 0 {
                    return Err(ServiceError::BookUnavailable);
                }
                adjust_stock(&mut tx, ctx.book_id, transition.stock_delta()).await?;
                let borrow = set_status(&mut tx, ctx.borrow_id, transition.target()).await?;
                notify(
                    &mut tx,
                    ctx.user_id,
                    &messages::borrow_approved(&ctx.book_name, ctx.due_date),
                    NotificationKind::Borrow,
                )
                .await?;
                notify_all_admins(
                    &mut tx,
                    &messages::admin_approved(&ctx.username, &ctx.book_name),
                    NotificationKind::AdminAlert,
                    Some(ctx.user_id),
                )
                .await?;
                StatusChange { borrow, fine: None }
            }
            Transition::Close => {
                let fine = policy::fine_for(ctx.due_date, now);
                let borrow = sqlx::query_as::<_, Borrow>(&format!(
                    "UPDATE borrows SET status = 'closed', return_date = $2, fine = $3
                     WHERE borrow_id = $1
                     RETURNING {}",
                    BORROW_COLUMNS
                ))
                .bind(ctx.borrow_id)
                .bind(now)
                .bind(fine)
                .fetch_one(&mut *tx)
                .await?;
                adjust_stock(&mut tx, ctx.book_id, transition.stock_delta()).await?;

                let (message, kind) = if fine > 0 {
                    (
                        messages::borrow_closed_with_fine(&ctx.book_name, fine),
                        NotificationKind::Fine,
                    )
                } else {
                    (
                        messages::borrow_closed_on_time(&ctx.book_name),
                        NotificationKind::Return,
                    )
                };
                notify(&mut tx, ctx.user_id, &message, kind).await?;
                notify_all_admins(
                    &mut tx,
                    &messages::admin_returned(&ctx.username, &ctx.book_name, fine),
                    NotificationKind::AdminAlert,
                    Some(ctx.user_id),
                )
                .await?;
                StatusChange {
                    borrow,
                    fine: Some(fine),
                }
            }
            Transition::Overwrite(status) => {
                log::warn!(
                    "borrow {} status overwritten {} -> {} without side effects",
                    ctx.borrow_id,
                    ctx.status,
                    status
                );
                let borrow = set_status(&mut tx, ctx.borrow_id, status).await?;
                StatusChange { borrow, fine: None }
            }
        };

        tx.commit().await?;

        log::info!(
            "borrow {} moved {} -> {} by admin {} (book {}, stock delta {})",
            ctx.borrow_id,
            ctx.status,
            change.borrow.status,
            caller.user_id,
            ctx.book_id,
            transition.stock_delta()
        );
        Ok(change)
    }
}

async fn set_status(
    conn: &mut PgConnection,
    borrow_id: i32,
    status: BorrowStatus,
) -> Result<Borrow, ServiceError> {
    let borrow = sqlx::query_as::<_, Borrow>(&format!(
        "UPDATE borrows SET status = $2 WHERE borrow_id = $1 RETURNING {}",
        BORROW_COLUMNS
    ))
    .bind(borrow_id)
    .bind(status)
    .fetch_one(&mut *conn)
    .await?;
    Ok(borrow)
}

/// Applies `delta` to a book's stock, refusing to take it below zero.
async fn adjust_stock(conn: &mut PgConnection, book_id: i32, delta: i32) -> Result<(), ServiceError> {
    let result = sqlx::query(
        "UPDATE books SET stock = stock + $2 WHERE book_id = $1 AND stock + $2 >= 0",
    )
    .bind(book_id)
    .bind(delta)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::BookUnavailable);
    }
    Ok(())
}
