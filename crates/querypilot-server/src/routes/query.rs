//! Question-asking endpoints for authenticated callers.

use axum::Json;
use axum::extract::State;
use tracing::info;

use querypilot_core::Connection;
use querypilot_core::wire::{AskRequest, AskResponse};

use crate::error::ApiError;
use crate::extract::AuthedUser;
use crate::routes::AppState;
use crate::storage::ConnectionRow;

/// `GET /api/v1/query/connections`
///
/// The connections this caller may query right now: every registered
/// connection for admins, the granted subset for analysts. Schema DDL is
/// not included in this view.
pub async fn connections(
    AuthedUser(identity): AuthedUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Connection>>, ApiError> {
    let rows = state.gateway.list_accessible(&identity).await?;
    let connections = rows
        .iter()
        .map(ConnectionRow::to_summary)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(connections))
}

/// `POST /api/v1/query/ask`
///
/// Access is evaluated here, at submission time, regardless of what any
/// earlier listing said. The engine's safety verdict travels back
/// unmodified, next to whatever rows were produced.
pub async fn ask(
    AuthedUser(identity): AuthedUser,
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("Question must not be empty".into()));
    }

    let row = state.gateway.check_access(&identity, req.connection_id).await?;

    info!(
        user_id = identity.id,
        connection_id = req.connection_id,
        "Question submitted"
    );
    let answer = state.engine.ask(&row, question).await?;

    Ok(Json(AskResponse {
        sql: answer.sql,
        result: answer.rows,
        safety_check: answer.safety_check,
    }))
}
