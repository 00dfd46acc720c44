//! Data models for QueryPilot storage.

use querypilot_core::db::DatabaseError;
use querypilot_core::wire::Permission;
use querypilot_core::{Connection, UserIdentity};

/// An account row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Current identity snapshot for this row.
    pub fn identity(&self) -> Result<UserIdentity, DatabaseError> {
        let role = self
            .role
            .parse()
            .map_err(|_| DatabaseError::Query(format!("invalid role for user {}", self.id)))?;
        Ok(UserIdentity {
            id: self.id,
            username: self.username.clone(),
            role,
        })
    }
}

/// A registered connection row, including the stored credential.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConnectionRow {
    pub id: i64,
    pub name: String,
    pub db_type: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub schema_ddl: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ConnectionRow {
    /// Full wire view (admin responses). The credential never leaves storage.
    pub fn to_connection(&self) -> Result<Connection, DatabaseError> {
        let kind = self.db_type.parse().map_err(|_| {
            DatabaseError::Query(format!("invalid db type for connection {}", self.id))
        })?;
        Ok(Connection {
            id: self.id,
            name: self.name.clone(),
            kind,
            url: self.url.clone(),
            username: self.username.clone(),
            schema_ddl: self.schema_ddl.clone(),
        })
    }

    /// Wire view for analysts: the cached schema DDL stays server-side.
    pub fn to_summary(&self) -> Result<Connection, DatabaseError> {
        let mut conn = self.to_connection()?;
        conn.schema_ddl = None;
        Ok(conn)
    }
}

/// A granted (user, connection) pair.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PermissionRow {
    pub id: i64,
    pub user_id: i64,
    pub connection_id: i64,
    pub created_at: i64,
}

impl PermissionRow {
    pub const fn to_wire(&self) -> Permission {
        Permission {
            id: self.id,
            user_id: self.user_id,
            connection_id: self.connection_id,
        }
    }
}
