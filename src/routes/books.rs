use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{BookInput, BookQuery},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

/// Lists the catalog, newest first.
///
/// ## Query Parameters:
/// - `search` (optional): case-insensitive match against name and author.
/// - `category` (optional): one of the catalog categories, e.g. `"fiction"`.
#[get("")]
pub async fn get_books(
    state: web::Data<AppState>,
    query: web::Query<BookQuery>,
) -> Result<impl Responder, AppError> {
    let books = state.catalog.list(&query).await?;
    Ok(HttpResponse::Ok().json(books))
}

#[get("/{book_id}")]
pub async fn get_book(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let book = state.catalog.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(book))
}

/// Adds a book to the catalog (admin only).
///
/// ## Responses:
/// - `201 Created`: the stored `Book`.
/// - `403 Forbidden`: caller is not an admin.
/// - `422 Unprocessable Entity`: e.g. a year that is not four digits or negative stock.
#[post("")]
pub async fn create_book(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    input: web::Json<BookInput>,
) -> Result<impl Responder, AppError> {
    let book = state.catalog.create(&caller, &input).await?;
    Ok(HttpResponse::Created().json(book))
}

#[put("/{book_id}")]
pub async fn update_book(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<BookInput>,
) -> Result<impl Responder, AppError> {
    let book = state
        .catalog
        .update(&caller, path.into_inner(), &input)
        .await?;
    Ok(HttpResponse::Ok().json(book))
}

#[delete("/{book_id}")]
pub async fn delete_book(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state.catalog.delete(&caller, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
