//! Access gateway: the single decision point for connection access.
//!
//! Every privileged operation consults the gateway at the moment it runs.
//! Nothing is decided from cached lists: listing a connection and querying
//! it are separate evaluations against current permission rows, so a revoke
//! takes effect on the very next request.

use tracing::warn;

use querypilot_core::UserIdentity;

use crate::error::ApiError;
use crate::storage::{ConnectionRow, Database};

/// Two-tier access decisions over the connection registry.
///
/// Admins pass unconditionally. Analysts pass only when a grant row exists
/// for the (user, connection) pair at evaluation time.
#[derive(Clone)]
pub struct AccessGateway {
    db: Database,
}

impl AccessGateway {
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Evaluate access to one connection and return it on ALLOW.
    ///
    /// An unknown connection is a 404 for every caller; a known connection
    /// without a grant is a 403. DENY is terminal for the request.
    pub async fn check_access(
        &self,
        identity: &UserIdentity,
        connection_id: i64,
    ) -> Result<ConnectionRow, ApiError> {
        let row = self.db.get_connection(connection_id).await?;

        if identity.is_admin() {
            return Ok(row);
        }

        if self.db.has_permission(identity.id, connection_id).await? {
            return Ok(row);
        }

        warn!(
            user_id = identity.id,
            connection_id, "Access denied to connection"
        );
        Err(ApiError::Forbidden(format!(
            "You do not have access to connection {connection_id}"
        )))
    }

    /// The connections this caller may query, derived from current state:
    /// the full registry for admins, the granted subset for analysts.
    pub async fn list_accessible(
        &self,
        identity: &UserIdentity,
    ) -> Result<Vec<ConnectionRow>, ApiError> {
        let rows = if identity.is_admin() {
            self.db.list_connections().await?
        } else {
            self.db.connections_for_user(identity.id).await?
        };
        Ok(rows)
    }
}
