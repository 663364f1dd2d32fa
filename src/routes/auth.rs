use crate::{
    auth::{generate_token, verify_password, AuthResponse, LoginRequest, SessionUser},
    error::AppError,
    models::User,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::FromRow;
use validator::Validate;

#[derive(FromRow)]
struct StoredCredentials {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Sign in with email and password
///
/// Returns a bearer token and the session identity (id, username, role, image).
/// Unknown email and wrong password get the same 401 so neither leaks which accounts exist.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let stored = sqlx::query_as::<_, StoredCredentials>(
        "SELECT user_id, username, email, role, image, created_at, password_hash
         FROM users WHERE email = $1",
    )
    .bind(&login_data.email)
    .fetch_optional(&state.pool)
    .await?;

    let Some(stored) = stored else {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    };

    if !verify_password(&login_data.password, &stored.password_hash)? {
        log::info!("failed login for user {}", stored.user.user_id);
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let token = generate_token(stored.user.user_id, stored.user.role)?;
    log::info!("user {} signed in", stored.user.user_id);

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: SessionUser::from(stored.user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use serde_json::json;
    use sqlx::PgPool;

    // Validation fails before any query runs, so a lazy pool that never connects is enough.
    fn lazy_state() -> AppState {
        AppState::new(PgPool::connect_lazy("postgres://nobody@127.0.0.1:1/library").unwrap())
    }

    #[actix_rt::test]
    async fn test_login_validation() {
        let app = test::init_service(
            actix_web::App::new()
                .app_data(web::Data::new(lazy_state()))
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({
                "email": "invalid-email",
                "password": "password123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "reader@library.test", "password": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "reader@library.test" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
