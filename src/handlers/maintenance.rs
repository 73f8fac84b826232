use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMaintenanceBody {
    pub maintenance_mode: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMaintenanceResponse {
    pub success: bool,
    pub maintenance_mode: bool,
    pub message: String,
}

/// POST /set-maintenance-mode - toggle the flag (admin). Stays reachable
/// during maintenance so the mode can be turned back off.
pub async fn set_maintenance_mode(
    State(state): State<AppState>,
    Json(body): Json<SetMaintenanceBody>,
) -> Result<Json<SetMaintenanceResponse>> {
    let conn = state.db.get()?;
    state.maintenance.set(&conn, body.maintenance_mode)?;

    tracing::info!(enabled = body.maintenance_mode, "Maintenance mode changed");

    Ok(Json(SetMaintenanceResponse {
        success: true,
        maintenance_mode: body.maintenance_mode,
        message: if body.maintenance_mode {
            "Maintenance mode enabled.".into()
        } else {
            "Maintenance mode disabled.".into()
        },
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceStatusResponse {
    pub maintenance_mode: bool,
}

/// GET /get-maintenance-status - always reachable, memory read only.
pub async fn get_maintenance_status(
    State(state): State<AppState>,
) -> Json<MaintenanceStatusResponse> {
    Json(MaintenanceStatusResponse {
        maintenance_mode: state.maintenance.get(),
    })
}
