use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::identity;
use crate::models::{License, UserRecord};
use crate::registry::{self, Grant, RevokeOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLicenseBody {
    pub max_activations: u32,
    /// Days until expiry; omitted = server default. Zero or negative mints
    /// an already-expired key.
    #[serde(default)]
    pub validity_days: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLicenseResponse {
    pub success: bool,
    pub license_key: String,
    pub expires_at: Option<i64>,
    pub message: String,
}

/// POST /generate-license - mint a fresh key (admin).
pub async fn generate_license(
    State(state): State<AppState>,
    Json(body): Json<GenerateLicenseBody>,
) -> Result<Json<GenerateLicenseResponse>> {
    if body.max_activations == 0 {
        return Err(AppError::BadRequest(
            "maxActivations must be a positive integer".into(),
        ));
    }

    let validity_days = body.validity_days.unwrap_or(state.default_validity_days);

    let conn = state.db.get()?;
    let license = registry::issue(&conn, body.max_activations, validity_days)?;

    tracing::info!(
        license_key = %license.license_key,
        max_activations = license.max_activations,
        "License issued"
    );

    Ok(Json(GenerateLicenseResponse {
        success: true,
        license_key: license.license_key,
        expires_at: license.expires_at,
        message: "License generated successfully.".into(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemBody {
    pub license_key: String,
    /// Email or IP address, depending on how the key was sold.
    pub identity: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub granted: bool,
    pub message: String,
}

/// POST /validate-and-register-license - the redemption endpoint.
pub async fn validate_and_register_license(
    State(state): State<AppState>,
    Json(body): Json<RedeemBody>,
) -> Result<Json<RedeemResponse>> {
    if body.license_key.trim().is_empty() || body.identity.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Missing parameters: licenseKey or identity".into(),
        ));
    }

    let mut conn = state.db.get()?;
    let redemption = registry::redeem(&mut conn, &body.license_key, &body.identity)?;

    // The grant is already committed; reader bookkeeping must not undo it.
    // Only email identities have a user record to upsert.
    if body.identity.contains('@') {
        if let Err(e) = identity::upsert_on_redemption(
            &conn,
            &body.identity,
            body.display_name.as_deref(),
            &body.license_key,
        ) {
            tracing::warn!(
                identity = %body.identity,
                error = %e,
                "User record upsert failed after grant"
            );
        }
    }

    let message = match redemption.grant {
        Grant::NewActivation => {
            state.mailer.spawn_welcome(
                body.identity.clone(),
                body.display_name.clone(),
                body.license_key.clone(),
            );
            "License activated successfully.".to_string()
        }
        Grant::Reaccess => "License valid and already active for this identity.".to_string(),
    };

    tracing::info!(
        license_key = %body.license_key,
        identity = %body.identity,
        grant = ?redemption.grant,
        "Redemption granted"
    );

    Ok(Json(RedeemResponse {
        granted: true,
        message,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateLicenseBody {
    pub license_key: String,
}

#[derive(Debug, Serialize)]
pub struct InvalidateLicenseResponse {
    pub success: bool,
    pub message: String,
}

/// POST /invalidate-license - revoke a key (admin). Idempotent.
pub async fn invalidate_license(
    State(state): State<AppState>,
    Json(body): Json<InvalidateLicenseBody>,
) -> Result<Json<InvalidateLicenseResponse>> {
    if body.license_key.trim().is_empty() {
        return Err(AppError::BadRequest("Missing parameter: licenseKey".into()));
    }

    let conn = state.db.get()?;
    let outcome = registry::revoke(&conn, &body.license_key)?;

    let message = match outcome {
        RevokeOutcome::Revoked => {
            tracing::info!(license_key = %body.license_key, "License revoked");
            "License revoked.".to_string()
        }
        RevokeOutcome::AlreadyRevoked => "License was already revoked.".to_string(),
    };

    Ok(Json(InvalidateLicenseResponse {
        success: true,
        message,
    }))
}

#[derive(Debug, Serialize)]
pub struct ListLicensesResponse {
    pub success: bool,
    pub licenses: Vec<License>,
}

/// GET /licenses - full dump of license rows (admin).
pub async fn list_licenses(State(state): State<AppState>) -> Result<Json<ListLicensesResponse>> {
    let conn = state.db.get()?;
    let licenses = queries::list_licenses(&conn)?;
    Ok(Json(ListLicensesResponse {
        success: true,
        licenses,
    }))
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub success: bool,
    pub users: Vec<UserRecord>,
}

/// GET /users - full dump of reader records (admin).
pub async fn list_users(State(state): State<AppState>) -> Result<Json<ListUsersResponse>> {
    let conn = state.db.get()?;
    let users = queries::list_users(&conn)?;
    Ok(Json(ListUsersResponse {
        success: true,
        users,
    }))
}
