use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::StatusCode, rt, test, web, App, HttpServer};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Once;

use libris::auth::{hash_password, AuthMiddleware, AuthResponse, Claims};
use libris::models::Role;
use libris::routes::{self, health};
use libris::AppState;

const TEST_JWT_SECRET: &str = "integration-test-secret";

static JWT_SECRET_INIT: Once = Once::new();

// Every test in this binary signs and verifies with the same key, so it is set
// once and never changed while tests run in parallel.
fn use_test_jwt_secret() {
    JWT_SECRET_INIT.call_once(|| std::env::set_var("JWT_SECRET", TEST_JWT_SECRET));
}

// Requests rejected before any query runs never open a connection.
fn unconnected_pool() -> PgPool {
    PgPool::connect_lazy("postgres://nobody@127.0.0.1:1/library").expect("valid database url")
}

async fn insert_account(pool: &PgPool, username: &str, email: &str, role: Role) -> i32 {
    let (user_id,) = sqlx::query_as::<_, (i32,)>(
        "INSERT INTO users (username, email, password_hash, role, image)
         VALUES ($1, $2, $3, $4, $5) RETURNING user_id",
    )
    .bind(username)
    .bind(email)
    .bind(hash_password("Password123!").unwrap())
    .bind(role)
    .bind(format!("avatars/{}.png", username))
    .fetch_one(pool)
    .await
    .unwrap();
    user_id
}

async fn login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        StatusCode::OK,
        "Login failed. Body: {:?}",
        String::from_utf8_lossy(&body)
    );
    serde_json::from_slice(&body).expect("Failed to parse login response JSON")
}

#[actix_rt::test]
async fn test_borrow_request_unauthorized() {
    use_test_jwt_secret();

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let state = web::Data::new(AppState::new(unconnected_pool()));
    let server_handle = rt::spawn(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(Logger::default())
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                )
        })
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run()
        .await
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/borrows", port))
        .json(&json!({ "book_id": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("http://127.0.0.1:{}/api/notifications", port))
        .bearer_auth("not-a-token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let forged = encode(
        &Header::default(),
        &Claims {
            sub: 1,
            role: Role::Admin,
            exp: usize::MAX / 2,
        },
        &EncodingKey::from_secret(b"some-other-key"),
    )
    .unwrap();
    let resp = client
        .get(format!("http://127.0.0.1:{}/api/borrows", port))
        .bearer_auth(forged)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Self-registration does not exist; accounts are created by admins.
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/auth/register", port))
        .json(&json!({ "username": "x", "email": "x@library.test", "password": "Password123!" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    server_handle.abort();
}

#[actix_rt::test]
async fn test_invalid_login_inputs() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::new(unconnected_pool())))
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await;

    let test_cases = vec![
        (
            json!({ "password": "Password123!" }),
            StatusCode::BAD_REQUEST,
            "missing email",
        ),
        (
            json!({ "email": "reader@library.test" }),
            StatusCode::BAD_REQUEST,
            "missing password",
        ),
        (
            json!({ "email": "invalid-email", "password": "Password123!" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid email format",
        ),
        (
            json!({ "email": "reader@library.test", "password": "" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "empty password",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(&payload)
            .to_request();

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body_bytes = test::read_body(resp).await;

        assert_eq!(
            status,
            expected_status,
            "Test case failed: {}. Expected {}, got {}. Body: {:?}",
            description,
            expected_status,
            status,
            String::from_utf8_lossy(&body_bytes)
        );
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_login_borrow_and_approve_flow(pool: PgPool) {
    use_test_jwt_secret();

    let librarian_id =
        insert_account(&pool, "librarian", "librarian@library.test", Role::Admin).await;
    let reader_id = insert_account(&pool, "reader_one", "reader@library.test", Role::User).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::new(pool.clone())))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await;

    let reader = login(&app, "reader@library.test", "Password123!").await;
    assert_eq!(reader.user.id, reader_id);
    assert_eq!(reader.user.username, "reader_one");
    assert_eq!(reader.user.role, Role::User);
    assert_eq!(reader.user.image.as_deref(), Some("avatars/reader_one.png"));

    let admin = login(&app, "librarian@library.test", "Password123!").await;
    assert_eq!(admin.user.id, librarian_id);
    assert_eq!(admin.user.role, Role::Admin);

    for (email, password) in [
        ("reader@library.test", "WrongPassword1"),
        ("nobody@library.test", "Password123!"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    let book_payload = json!({
        "name": "The Left Hand of Darkness",
        "author": "Ursula K. Le Guin",
        "year_published": "1969",
        "category": "fiction",
        "stock": 1
    });
    let req = test::TestRequest::post()
        .uri("/api/books")
        .insert_header(("Authorization", format!("Bearer {}", reader.token)))
        .set_json(&book_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/books")
        .insert_header(("Authorization", format!("Bearer {}", admin.token)))
        .set_json(&book_payload)
        .to_request();
    let book: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let book_id = book["book_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/borrows")
        .insert_header(("Authorization", format!("Bearer {}", reader.token)))
        .set_json(json!({ "book_id": book_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let borrow: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(borrow["status"], "pending");
    let borrow_id = borrow["borrow_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/borrows")
        .insert_header(("Authorization", format!("Bearer {}", reader.token)))
        .set_json(json!({ "book_id": book_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let status_uri = format!("/api/borrows/{}/status", borrow_id);
    let req = test::TestRequest::patch()
        .uri(&status_uri)
        .insert_header(("Authorization", format!("Bearer {}", reader.token)))
        .set_json(json!({ "status": "progress" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&status_uri)
        .insert_header(("Authorization", format!("Bearer {}", admin.token)))
        .set_json(json!({ "status": "progress" }))
        .to_request();
    let change: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(change["borrow"]["status"], "progress");

    let req = test::TestRequest::get()
        .uri("/api/borrows/mine")
        .insert_header(("Authorization", format!("Bearer {}", reader.token)))
        .to_request();
    let mine: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["status"], "progress");

    let req = test::TestRequest::get()
        .uri("/api/notifications/unread-count")
        .insert_header(("Authorization", format!("Bearer {}", reader.token)))
        .to_request();
    let count: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(count["count"], 2);

    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(("Authorization", format!("Bearer {}", reader.token)))
        .to_request();
    let me: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["username"], "reader_one");
    assert!(me.get("password_hash").is_none());
}
