//! Database queries for the `QueryPilot` server.

use querypilot_core::db::{DatabaseError, unix_timestamp};
use querypilot_core::{DatabaseKind, UserRole};

use super::Database;
use super::models::{ConnectionRow, PermissionRow, User};

impl Database {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Create a new user.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user(result.last_insert_rowid()).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: i64) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Get a user by username.
    pub async fn get_user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User with username {username}")))
    }

    /// Change a user's role. Takes effect on the user's next request.
    pub async fn set_user_role(&self, id: i64, role: UserRole) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?;

        self.get_user(id).await
    }

    // =========================================================================
    // Connection queries
    // =========================================================================

    /// Register a new connection.
    pub async fn create_connection(
        &self,
        name: &str,
        kind: DatabaseKind,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<ConnectionRow, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "INSERT INTO connections (name, db_type, url, username, password, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(kind.as_str())
        .bind(url)
        .bind(username)
        .bind(password)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_connection(result.last_insert_rowid()).await
    }

    /// Get a connection by ID.
    pub async fn get_connection(&self, id: i64) -> Result<ConnectionRow, DatabaseError> {
        sqlx::query_as::<_, ConnectionRow>("SELECT * FROM connections WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Connection {id}")))
    }

    /// List all registered connections.
    pub async fn list_connections(&self) -> Result<Vec<ConnectionRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ConnectionRow>("SELECT * FROM connections ORDER BY id")
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }

    /// Delete a connection. Grants referencing it go with it (cascade).
    pub async fn delete_connection(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM connections WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the cached schema DDL for a connection.
    pub async fn update_schema_ddl(
        &self,
        id: i64,
        schema_ddl: &str,
    ) -> Result<ConnectionRow, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query("UPDATE connections SET schema_ddl = ?, updated_at = ? WHERE id = ?")
            .bind(schema_ddl)
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?;

        self.get_connection(id).await
    }

    // =========================================================================
    // Permission queries
    // =========================================================================

    /// Grant a user access to a connection. Idempotent: granting an
    /// existing pair returns the existing grant.
    pub async fn grant_permission(
        &self,
        user_id: i64,
        connection_id: i64,
    ) -> Result<PermissionRow, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO permissions (user_id, connection_id, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, connection_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(connection_id)
        .bind(now)
        .execute(self.pool())
        .await?;

        sqlx::query_as::<_, PermissionRow>(
            "SELECT * FROM permissions WHERE user_id = ? AND connection_id = ?",
        )
        .bind(user_id)
        .bind(connection_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| {
            DatabaseError::NotFound(format!("Permission ({user_id}, {connection_id})"))
        })
    }

    /// Revoke a user's access to a connection. Idempotent: revoking a
    /// missing pair succeeds with zero rows affected.
    pub async fn revoke_permission(
        &self,
        user_id: i64,
        connection_id: i64,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM permissions WHERE user_id = ? AND connection_id = ?")
            .bind(user_id)
            .bind(connection_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    /// Whether a grant exists right now for this (user, connection) pair.
    pub async fn has_permission(
        &self,
        user_id: i64,
        connection_id: i64,
    ) -> Result<bool, DatabaseError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM permissions WHERE user_id = ? AND connection_id = ?",
        )
        .bind(user_id)
        .bind(connection_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.is_some())
    }

    /// All grants held by a user.
    pub async fn permissions_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<PermissionRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT * FROM permissions WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// All grants on a connection.
    pub async fn permissions_for_connection(
        &self,
        connection_id: i64,
    ) -> Result<Vec<PermissionRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT * FROM permissions WHERE connection_id = ? ORDER BY id",
        )
        .bind(connection_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Connections a user holds grants on, in registry order.
    pub async fn connections_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<ConnectionRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ConnectionRow>(
            "SELECT c.* FROM connections c \
             JOIN permissions p ON p.connection_id = c.id \
             WHERE p.user_id = ? ORDER BY c.id",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
