//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use slotswap_api::auth::jwt::{generate_access_token, JwtConfig};
use slotswap_api::config::ServerConfig;
use slotswap_api::router::build_app_router;
use slotswap_api::state::AppState;
use slotswap_api::ws::WsManager;
use slotswap_core::types::DbId;
use slotswap_events::EventBus;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(atomic_multi_write: bool) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        atomic_multi_write,
        jwt: test_jwt_config(),
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Bearer token for `user_id`, signed with the test secret.
pub fn token_for(user_id: DbId) -> String {
    generate_access_token(user_id, &test_jwt_config()).unwrap()
}

/// Build the full application router (transactional writes) on `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_state(pool, true).0
}

/// Build the router and return the state alongside it, so tests can
/// subscribe to the event bus.
pub fn build_test_app_with_state(pool: PgPool, atomic_multi_write: bool) -> (Router, AppState) {
    let config = test_config(atomic_multi_write);
    let state = AppState::new(
        pool,
        config.clone(),
        Arc::new(WsManager::new()),
        Arc::new(EventBus::default()),
    );
    (build_app_router(state.clone(), &config), state)
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    user_id: Option<DbId>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("authorization", format!("Bearer {}", token_for(user_id)));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_as(app: Router, uri: &str, user_id: DbId) -> Response<Body> {
    send(app, Method::GET, uri, Some(user_id), None).await
}

pub async fn post_json_as(app: Router, uri: &str, user_id: DbId, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(user_id), Some(body)).await
}

pub async fn put_json_as(app: Router, uri: &str, user_id: DbId, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(user_id), Some(body)).await
}

pub async fn delete_as(app: Router, uri: &str, user_id: DbId) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(user_id), None).await
}

/// Create one slot over HTTP and return its JSON.
pub async fn create_slot(
    app: &Router,
    user_id: DbId,
    title: &str,
    start: &str,
    end: &str,
    status_id: i16,
) -> Value {
    let response = post_json_as(
        app.clone(),
        "/api/v1/slots",
        user_id,
        serde_json::json!({
            "title": title,
            "start_time": start,
            "end_time": end,
            "status_id": status_id,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"][0].clone()
}

/// Fetch one of the caller's slots.
pub async fn fetch_slot(app: &Router, user_id: DbId, slot_id: i64) -> Value {
    let response = get_as(app.clone(), &format!("/api/v1/slots/{slot_id}"), user_id).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["data"].clone()
}
