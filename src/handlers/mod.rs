mod licenses;
mod maintenance;

pub use licenses::*;
pub use maintenance::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::db::AppState;
use crate::middleware::maintenance_gate;

async fn root() -> &'static str {
    "Bookkey license server is running."
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/generate-license", post(generate_license))
        .route("/validate-and-register-license", post(validate_and_register_license))
        .route("/invalidate-license", post(invalidate_license))
        .route("/licenses", get(list_licenses))
        .route("/users", get(list_users))
        .route("/set-maintenance-mode", post(set_maintenance_mode))
        .route("/get-maintenance-status", get(get_maintenance_status))
}

/// The full application: all routes behind the maintenance gate.
pub fn app(state: AppState) -> Router {
    router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            maintenance_gate,
        ))
        .with_state(state)
}
