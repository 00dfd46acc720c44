//! Admin endpoints for query permissions.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::info;

use querypilot_core::wire::{GrantPermissionRequest, Permission, RevokePermissionParams};

use crate::error::ApiError;
use crate::extract::AdminUser;
use crate::routes::AppState;

/// `POST /api/v1/admin/permissions`
///
/// Granting an already-granted pair succeeds and returns the existing
/// grant. Both sides must exist.
pub async fn grant(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<GrantPermissionRequest>,
) -> Result<Json<Permission>, ApiError> {
    state.db.get_user(req.user_id).await?;
    state.db.get_connection(req.connection_id).await?;

    let row = state
        .db
        .grant_permission(req.user_id, req.connection_id)
        .await?;
    info!(
        user_id = req.user_id,
        connection_id = req.connection_id,
        "Permission granted"
    );
    Ok(Json(row.to_wire()))
}

/// `DELETE /api/v1/admin/permissions?userId=&connectionId=`
///
/// Revoking a pair that is not granted is still a success.
pub async fn revoke(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(params): Query<RevokePermissionParams>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .db
        .revoke_permission(params.user_id, params.connection_id)
        .await?;
    if removed > 0 {
        info!(
            user_id = params.user_id,
            connection_id = params.connection_id,
            "Permission revoked"
        );
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/admin/permissions/user/{user_id}`
pub async fn for_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    let rows = state.db.permissions_for_user(user_id).await?;
    Ok(Json(rows.iter().map(|row| row.to_wire()).collect()))
}

/// `GET /api/v1/admin/permissions/connection/{connection_id}`
pub async fn for_connection(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(connection_id): Path<i64>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    let rows = state.db.permissions_for_connection(connection_id).await?;
    Ok(Json(rows.iter().map(|row| row.to_wire()).collect()))
}
