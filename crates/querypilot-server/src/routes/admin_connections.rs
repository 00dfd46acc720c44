//! Admin endpoints for the connection registry.
//!
//! All handlers require the admin role. Responses carry the full
//! connection view including cached schema DDL, but never credentials.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::{info, warn};

use querypilot_core::Connection;
use querypilot_core::wire::CreateConnectionRequest;

use crate::error::ApiError;
use crate::extract::AdminUser;
use crate::routes::AppState;
use crate::storage::ConnectionRow;

/// `GET /api/v1/admin/connections`
pub async fn list(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Connection>>, ApiError> {
    let rows = state.db.list_connections().await?;
    let connections = rows
        .iter()
        .map(ConnectionRow::to_connection)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(connections))
}

/// `GET /api/v1/admin/connections/{id}`
pub async fn get_one(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Connection>, ApiError> {
    let row = state.db.get_connection(id).await?;
    Ok(Json(row.to_connection()?))
}

/// `POST /api/v1/admin/connections`
///
/// Schema DDL is fetched eagerly so the first question against the
/// connection does not pay for introspection. A failed fetch only logs:
/// the connection is still registered and the schema can be refreshed
/// later.
pub async fn create(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateConnectionRequest>,
) -> Result<Json<Connection>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Connection name must not be empty".into()));
    }
    if req.url.trim().is_empty() {
        return Err(ApiError::BadRequest("Connection URL must not be empty".into()));
    }

    let row = state
        .db
        .create_connection(&req.name, req.kind, &req.url, &req.username, &req.password)
        .await?;
    info!(id = row.id, name = %row.name, "Connection registered");

    let row = match state.engine.fetch_schema(&row).await {
        Ok(ddl) => state.db.update_schema_ddl(row.id, &ddl).await?,
        Err(err) => {
            warn!(id = row.id, error = %err, "Schema fetch failed, registering without DDL");
            row
        }
    };

    Ok(Json(row.to_connection()?))
}

/// `DELETE /api/v1/admin/connections/{id}`
///
/// Grants on the connection are removed with it. Access is evaluated
/// through the gateway like every other connection-scoped operation.
pub async fn remove(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.gateway.check_access(&admin.0, id).await?;
    state.db.delete_connection(id).await?;
    info!(id, "Connection deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/admin/connections/{id}/refresh-schema`
///
/// On engine failure the stored DDL is left untouched.
pub async fn refresh_schema(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Connection>, ApiError> {
    let row = state.gateway.check_access(&admin.0, id).await?;
    let ddl = state.engine.fetch_schema(&row).await?;
    let row = state.db.update_schema_ddl(id, &ddl).await?;
    info!(id, "Schema refreshed");
    Ok(Json(row.to_connection()?))
}
