use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{AdminBorrowQuery, BorrowRequest, StatusUpdate},
    state::AppState,
};
use actix_web::{get, patch, post, web, HttpResponse, Responder};

/// Files a borrow request for the authenticated user.
///
/// The borrow starts `pending` with a due date 14 days out; stock is untouched until
/// an admin approves it.
///
/// ## Responses:
/// - `201 Created`: the new `Borrow`.
/// - `404 Not Found`: the book (or the caller's account) does not exist.
/// - `409 Conflict`: `{"success": false, "message": ...}` when the book is out of stock
///   or the caller already has an active borrow of it.
#[post("")]
pub async fn request_borrow(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    input: web::Json<BorrowRequest>,
) -> Result<impl Responder, AppError> {
    let borrow = state.borrows.request_borrow(&caller, input.book_id).await?;
    Ok(HttpResponse::Created().json(borrow))
}

/// Moves a borrow through its lifecycle (admin only).
///
/// `pending -> progress` takes a copy off the shelf, `progress -> closed` puts it back
/// and settles the fine. `closed` and `rejected` borrows cannot change again.
#[patch("/{borrow_id}/status")]
pub async fn change_status(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<StatusUpdate>,
) -> Result<impl Responder, AppError> {
    let change = state
        .borrows
        .change_status(&caller, path.into_inner(), input.status)
        .await?;
    Ok(HttpResponse::Ok().json(change))
}

/// Admin borrow table with optional `status`, `search` and `overdue` filters.
#[get("")]
pub async fn get_borrows(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    query: web::Query<AdminBorrowQuery>,
) -> Result<impl Responder, AppError> {
    let rows = state.projections.all_borrows(&caller, &query).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/mine")]
pub async fn get_my_borrows(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let rows = state.projections.user_borrows(&caller).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/summary")]
pub async fn get_summary(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let summary = state.projections.borrow_summary(&caller).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/stats")]
pub async fn get_stats(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let stats = state.projections.user_stats(&caller).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Flat labelled rows for the spreadsheet export (admin only).
#[get("/export")]
pub async fn export_borrows(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let rows = state.projections.export_rows(&caller).await?;
    Ok(HttpResponse::Ok().json(rows))
}
