//! Request middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::db::AppState;
use crate::error::AppError;

/// Routes that stay reachable while maintenance mode is on: liveness, the
/// status read, and the toggle itself (otherwise the mode could never be
/// turned back off over the API).
const MAINTENANCE_EXEMPT: &[&str] = &["/", "/get-maintenance-status", "/set-maintenance-mode"];

/// Reject all functional endpoints with 503 while the maintenance flag is
/// set. Reads the in-memory cache only.
pub async fn maintenance_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.maintenance.get() && !MAINTENANCE_EXEMPT.contains(&request.uri().path()) {
        return Err(AppError::Maintenance);
    }
    Ok(next.run(request).await)
}
