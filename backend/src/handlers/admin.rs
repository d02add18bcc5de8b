//! Admin handlers
//!
//! Public routes authenticated by the configured admin PIN instead of a JWT.

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::services::admin::{verify_pin, AdminUser, VerifyPinRequest, ADMIN_PIN_HEADER};
use crate::services::AdminService;
use crate::AppState;

/// Check a PIN before the admin dashboard is shown
pub async fn verify_admin_pin(
    State(state): State<AppState>,
    Json(body): Json<VerifyPinRequest>,
) -> AppResult<Json<Value>> {
    verify_pin(state.config.admin.pin.as_deref(), &body.pin)?;
    Ok(Json(json!({ "valid": true })))
}

/// Every registered user with their factory and subscription
pub async fn list_admin_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<AdminUser>>> {
    let pin = headers
        .get(ADMIN_PIN_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidAdminPin)?;
    verify_pin(state.config.admin.pin.as_deref(), pin)?;

    let users = AdminService::new(state.db.clone()).list_users().await?;
    Ok(Json(users))
}
