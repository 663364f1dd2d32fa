use crate::{auth::AuthenticatedUser, error::AppError, state::AppState};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde_json::json;

#[get("")]
pub async fn get_bookmarks(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let books = state.bookmarks.list(&caller).await?;
    Ok(HttpResponse::Ok().json(books))
}

#[get("/{book_id}")]
pub async fn is_bookmarked(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let bookmarked = state
        .bookmarks
        .is_bookmarked(&caller, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "bookmarked": bookmarked })))
}

/// Bookmarks a book. Repeating the call is harmless: `created` reports whether a
/// new bookmark (and its notification) was written.
#[post("/{book_id}")]
pub async fn add_bookmark(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let created = state.bookmarks.add(&caller, path.into_inner()).await?;
    let body = json!({ "bookmarked": true, "created": created });
    if created {
        Ok(HttpResponse::Created().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}

#[delete("/{book_id}")]
pub async fn remove_bookmark(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let removed = state.bookmarks.remove(&caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "bookmarked": false, "removed": removed })))
}
