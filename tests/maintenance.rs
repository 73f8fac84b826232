//! Tests for the maintenance gate: toggling, persistence, and which routes
//! stay reachable while the flag is on.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

#[tokio::test]
async fn maintenance_defaults_to_off() {
    let state = create_test_app_state();
    let app = test_app(state);

    let (status, body) = get_json(&app, "/get-maintenance-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["maintenanceMode"], false);
}

#[tokio::test]
async fn maintenance_blocks_functional_endpoints() {
    let state = create_test_app_state();
    let key = issue_test_license(&state, 1, 365);
    let app = test_app(state);

    let (status, body) = post_json(
        &app,
        "/set-maintenance-mode",
        json!({ "maintenanceMode": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["maintenanceMode"], true);

    // Functional endpoints are refused with 503.
    let (status, body) = post_json(
        &app,
        "/validate-and-register-license",
        json!({ "licenseKey": key, "identity": "alice@x.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);

    let (status, _) = post_json(&app, "/generate-license", json!({ "maxActivations": 1 })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = get_json(&app, "/licenses").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Status, liveness and the toggle itself stay reachable.
    let (status, body) = get_json(&app, "/get-maintenance-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["maintenanceMode"], true);

    let (status, _) = get_json(&app, "/").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        &app,
        "/set-maintenance-mode",
        json!({ "maintenanceMode": false }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Back in business.
    let (status, body) = post_json(
        &app,
        "/validate-and-register-license",
        json!({ "licenseKey": key, "identity": "alice@x.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["granted"], true);
}

#[tokio::test]
async fn maintenance_mode_is_persisted_to_the_store() {
    let state = create_test_app_state();
    let app = test_app(state.clone());

    post_json(
        &app,
        "/set-maintenance-mode",
        json!({ "maintenanceMode": true }),
    )
    .await;

    // A gate rebuilt from the same store sees the persisted flag, as a
    // restarted process would.
    let conn = state.db.get().unwrap();
    let reloaded = MaintenanceGate::load(&conn).unwrap();
    assert!(reloaded.get());
}
