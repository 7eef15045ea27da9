use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use furniture_backend::config::AppConfig;
use furniture_backend::infrastructure::database;
use furniture_backend::services::uploads::UploadStorage;
use furniture_backend::{AppState, create_app};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_app() -> (axum::Router, TempDir) {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        public_dir: dir.path().to_path_buf(),
        max_upload_size: 10 * 1024 * 1024,
        jwt_secret: "test_secret".to_string(),
        port: 0,
    };

    let storage = Arc::new(UploadStorage::new(
        config.temp_upload_dir(),
        config.permanent_upload_dir(),
        config.max_upload_size,
    ));
    storage.ensure_dirs().await.unwrap();

    let state = AppState {
        db,
        storage,
        config,
    };

    (create_app(state), dir)
}

async fn post_json(app: &axum::Router, uri: &str, body: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_and_login_round_trip() {
    let (app, _dir) = setup_app().await;

    let response = post_json(
        &app,
        "/api/auth/register",
        r#"{"email": "admin@shop.dev", "password": "password123", "name": "Store Admin"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["user"]["email"], "admin@shop.dev");
    assert_eq!(json["user"]["role"], "ADMIN");

    let response = post_json(
        &app,
        "/api/auth/login",
        r#"{"email": "admin@shop.dev", "password": "password123"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Session cookie for the browser admin panel
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], true);
    assert!(!json["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let (app, _dir) = setup_app().await;

    let body = r#"{"email": "admin@shop.dev", "password": "password123"}"#;
    let response = post_json(&app, "/api/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(&app, "/api/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_validates_input() {
    let (app, _dir) = setup_app().await;

    let response = post_json(
        &app,
        "/api/auth/register",
        r#"{"email": "not-an-email", "password": "password123"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        "/api/auth/register",
        r#"{"email": "admin@shop.dev", "password": "short"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (app, _dir) = setup_app().await;

    let response = post_json(
        &app,
        "/api/auth/register",
        r#"{"email": "admin@shop.dev", "password": "password123"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Wrong password and unknown email both yield the same 401
    let response = post_json(
        &app,
        "/api/auth/login",
        r#"{"email": "admin@shop.dev", "password": "wrong-password"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        &app,
        "/api/auth/login",
        r#"{"email": "nobody@shop.dev", "password": "password123"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_guarded_route_accepts_session_cookie() {
    let (app, _dir) = setup_app().await;

    let response = post_json(
        &app,
        "/api/auth/register",
        r#"{"email": "admin@shop.dev", "password": "password123"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        &app,
        "/api/auth/login",
        r#"{"email": "admin@shop.dev", "password": "password123"}"#,
    )
    .await;
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    let token = json["token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload/cleanup")
                .header(header::COOKIE, format!("theme=dark; token={}", token))
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"paths": []}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guarded_route_rejects_garbage_token() {
    let (app, _dir) = setup_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload/cleanup")
                .header("Authorization", "Bearer not-a-jwt")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"paths": []}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
