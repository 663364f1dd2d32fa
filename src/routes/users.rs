use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ProfileInput, UserInput, UserUpdateInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

/// All accounts, newest first (admin only).
#[get("")]
pub async fn get_users(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let users = state.users.list(&caller).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Creates an account with an explicit role (admin only). This is the only way
/// accounts come into existence.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    input: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    let user = state.users.create(&caller, &input).await?;
    Ok(HttpResponse::Created().json(user))
}

// Registered before `/{user_id}` so "me" is not parsed as an id.
#[get("/me")]
pub async fn get_profile(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = state.users.profile(&caller).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[put("/me")]
pub async fn update_profile(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    input: web::Json<ProfileInput>,
) -> Result<impl Responder, AppError> {
    let user = state.users.update_profile(&caller, &input).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[put("/{user_id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: web::Path<i32>,
    input: web::Json<UserUpdateInput>,
) -> Result<impl Responder, AppError> {
    let user = state
        .users
        .update(&caller, path.into_inner(), &input)
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/{user_id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state.users.delete(&caller, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
