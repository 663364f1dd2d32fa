use crate::{auth::AuthenticatedUser, error::AppError, state::AppState};
use actix_web::{delete, get, patch, web, HttpResponse, Responder};
use serde_json::json;

/// The caller's 50 most recent notifications.
#[get("")]
pub async fn get_notifications(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let notifications = state.notifications.list(&caller).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

#[get("/unread-count")]
pub async fn unread_count(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let count = state.notifications.unread_count(&caller).await?;
    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

#[patch("/read-all")]
pub async fn mark_all_read(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let updated = state.notifications.mark_all_read(&caller).await?;
    Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}

/// Marks one of the caller's notifications as read. Someone else's id is a 404.
#[patch("/{notification_id}/read")]
pub async fn mark_read(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state
        .notifications
        .mark_read(&caller, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/{notification_id}")]
pub async fn delete_notification(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state
        .notifications
        .delete(&caller, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
