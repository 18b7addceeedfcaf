//! In-process router tests: authentication and permission gates

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use catalog_server::{
    api,
    config::AppConfig,
    models::user::{Permission, UserClaims},
    repository::Repository,
    services::{redis::RedisService, Services},
    AppState,
};

const COPY_ID: &str = "6b0a4b53-3f7a-4a39-9f57-4a3d4d1f2c11";

/// Router over a pool that never connects; requests rejected before any query never notice
fn test_app() -> (Router, AppConfig) {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .unwrap();
    let redis = RedisService::open(&config.redis.url).unwrap();

    let services = Services::new(
        Repository::new(pool),
        config.auth.clone(),
        config.session.clone(),
        redis,
    );
    let state = AppState {
        config: Arc::new(config.clone()),
        services: Arc::new(services),
    };
    (api::router(state), config)
}

fn token(config: &AppConfig, permissions: Vec<Permission>) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: "patron".to_string(),
        user_id: 7,
        permissions,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&config.auth.jwt_secret)
    .unwrap()
}

fn request(method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = test_app();

    let response = app
        .oneshot(request(Method::GET, "/api/v1/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _) = test_app();

    let response = app
        .oneshot(request(Method::GET, "/api-docs/openapi.json", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["paths"]["/book/{id}/renew"].is_object());
}

#[tokio::test]
async fn test_my_books_requires_login() {
    let (app, _) = test_app();

    let response = app
        .oneshot(request(Method::GET, "/api/v1/mybooks", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], 2);
    assert_eq!(body["error"], "NotAuthenticated");
}

#[tokio::test]
async fn test_garbage_and_non_bearer_tokens_rejected() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/borrowed", Some("not-a-jwt"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let basic = Request::builder()
        .uri("/api/v1/borrowed")
        .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(basic).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let (app, _) = test_app();
    let mut other = AppConfig::default();
    other.auth.jwt_secret = "someone-else".to_string();
    let forged = token(&other, vec![Permission::CanMarkReturned]);

    let response = app
        .oneshot(request(Method::GET, "/api/v1/allbooks", Some(&forged), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_pages_forbidden_without_permission() {
    let (app, config) = test_app();
    let patron = token(&config, Vec::new());

    for uri in [
        "/api/v1/borrowed".to_string(),
        "/api/v1/allbooks".to_string(),
        format!("/api/v1/book/{}/renew", COPY_ID),
        format!("/api/v1/copies/{}", COPY_ID),
    ] {
        let response = app
            .clone()
            .oneshot(request(Method::GET, &uri, Some(&patron), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "GET {}", uri);

        let body = json_body(response).await;
        assert_eq!(body["code"], 3);
        assert_eq!(body["message"], "Missing permission: can_mark_returned");
    }
}

#[tokio::test]
async fn test_renewal_submit_forbidden_without_permission() {
    let (app, config) = test_app();
    let patron = token(&config, Vec::new());

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/book/{}/renew", COPY_ID),
            Some(&patron),
            Some(json!({ "renewal_date": "2024-01-20" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_renewal_submit_requires_login() {
    let (app, _) = test_app();

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/book/{}/renew", COPY_ID),
            None,
            Some(json!({ "renewal_date": "2024-01-20" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_renewal_with_unreadable_date_is_a_field_error() {
    let (app, config) = test_app();
    let staff = token(&config, vec![Permission::CanMarkReturned]);
    let uri = format!("/api/v1/book/{}/renew", COPY_ID);

    for body in [json!({ "renewal_date": 20240120 }), json!(["2024-01-20"])] {
        let response = app
            .clone()
            .oneshot(request(Method::POST, &uri, Some(&staff), Some(body.clone())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        let body = json_body(response).await;
        assert_eq!(body["code"], 6);
        assert_eq!(body["error"], "InvalidForm");
        assert_eq!(body["fields"]["renewal_date"][0], "Enter a valid date.");
    }
}

#[tokio::test]
async fn test_renewal_permission_checked_before_body() {
    let (app, config) = test_app();
    let patron = token(&config, Vec::new());

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/book/{}/renew", COPY_ID),
            Some(&patron),
            Some(json!({ "renewal_date": 20240120 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_catalog_edits_forbidden_without_permission() {
    let (app, config) = test_app();
    let patron = token(&config, Vec::new());

    let cases = [
        (
            Method::POST,
            "/api/v1/authors",
            Some(json!({ "first_name": "Ursula", "last_name": "Le Guin" })),
        ),
        (Method::DELETE, "/api/v1/authors/1", None),
        (Method::DELETE, "/api/v1/books/1", None),
        (Method::POST, "/api/v1/genres", Some(json!({ "name": "Fantasy" }))),
        (Method::DELETE, "/api/v1/languages/1", None),
        (
            Method::POST,
            "/api/v1/users",
            Some(json!({ "username": "mallory", "password": "secret" })),
        ),
    ];

    for (method, uri, body) in cases {
        let response = app
            .clone()
            .oneshot(request(method.clone(), uri, Some(&patron), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
    }
}
