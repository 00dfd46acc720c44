//! Request and response bodies for the `QueryPilot` HTTP JSON API.
//!
//! Field names follow the wire convention (camelCase), so these types are
//! the single source of truth for both the server handlers and the CLI
//! client.

use serde::{Deserialize, Serialize};

use crate::connection::DatabaseKind;
use crate::identity::UserRole;
use crate::table::JsonRow;

/// `POST /auth/login` and `POST /auth/register` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Successful authentication response. Login and register both land here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub role: UserRole,
}

/// `POST /admin/connections` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConnectionRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DatabaseKind,
    pub url: String,
    pub username: String,
    pub password: String,
}

/// A granted (user, connection) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: i64,
    pub user_id: i64,
    pub connection_id: i64,
}

/// `POST /admin/permissions` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantPermissionRequest {
    pub user_id: i64,
    pub connection_id: i64,
}

/// `DELETE /admin/permissions` query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokePermissionParams {
    pub user_id: i64,
    pub connection_id: i64,
}

/// `POST /query/ask` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub connection_id: i64,
    pub question: String,
}

/// `POST /query/ask` response body.
///
/// `safety_check` is an opaque verdict (`"PASSED"` or a warning text) and
/// is carried through unmodified. Rows and verdict are independent: a
/// non-passed verdict still ships whatever rows were produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub sql: String,
    #[serde(default)]
    pub result: Vec<JsonRow>,
    pub safety_check: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
    pub timestamp: i64,
}
