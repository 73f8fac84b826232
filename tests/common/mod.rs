//! Test utilities and fixtures for Bookkey integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub use bookkey::db::{create_pool, init_db, queries, AppState};
pub use bookkey::email::Mailer;
pub use bookkey::maintenance::MaintenanceGate;
pub use bookkey::models::*;
pub use bookkey::registry;

/// Create an in-memory test app state. The pool is capped at one connection
/// so every request sees the same in-memory database.
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();

    let maintenance = {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
        MaintenanceGate::load(&conn).unwrap()
    };

    AppState {
        db: pool,
        maintenance,
        mailer: Arc::new(Mailer::new(None, "test@example.com".to_string())),
        default_validity_days: 365,
    }
}

/// The full router, maintenance gate included.
pub fn test_app(state: AppState) -> Router {
    bookkey::handlers::app(state)
}

/// Issue a license directly against the store, bypassing the HTTP layer.
pub fn issue_test_license(state: &AppState, max_activations: u32, validity_days: i64) -> String {
    let conn = state.db.get().unwrap();
    registry::issue(&conn, max_activations, validity_days)
        .unwrap()
        .license_key
}

/// POST a JSON body and return (status, parsed response body).
pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// GET a path and return (status, parsed response body). Non-JSON bodies
/// come back as Value::Null.
pub async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
