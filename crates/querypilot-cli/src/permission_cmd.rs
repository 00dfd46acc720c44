//! Permission subcommands. These require the admin role.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use querypilot_core::wire::Permission;

use crate::client::{ApiClient, authed_client};
use crate::config::CliConfig;

/// Permission subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum PermissionAction {
    /// Grant a user access to a connection. Granting twice is a no-op.
    Grant {
        /// User ID.
        user_id: i64,
        /// Connection ID.
        connection_id: i64,
    },
    /// Revoke a user's access to a connection. Revoking a grant that
    /// never existed succeeds quietly.
    Revoke {
        /// User ID.
        user_id: i64,
        /// Connection ID.
        connection_id: i64,
    },
    /// List one user's grants.
    ForUser {
        /// User ID.
        user_id: i64,
    },
    /// List the grants on one connection.
    ForConnection {
        /// Connection ID.
        connection_id: i64,
    },
}

/// Execute a permission subcommand.
pub async fn run(action: PermissionAction, config: &CliConfig) -> anyhow::Result<()> {
    let client = authed_client(config)?;
    match action {
        PermissionAction::Grant {
            user_id,
            connection_id,
        } => grant(&client, user_id, connection_id).await,
        PermissionAction::Revoke {
            user_id,
            connection_id,
        } => revoke(&client, user_id, connection_id).await,
        PermissionAction::ForUser { user_id } => {
            let permissions = client.permissions_for_user(user_id).await?;
            print_permissions(&permissions)
        }
        PermissionAction::ForConnection { connection_id } => {
            let permissions = client.permissions_for_connection(connection_id).await?;
            print_permissions(&permissions)
        }
    }
}

async fn grant(client: &ApiClient, user_id: i64, connection_id: i64) -> anyhow::Result<()> {
    let p = client.grant_permission(user_id, connection_id).await?;
    let mut out = io::stdout();
    writeln!(
        out,
        "User {} may query connection {}",
        p.user_id, p.connection_id
    )?;
    Ok(())
}

async fn revoke(client: &ApiClient, user_id: i64, connection_id: i64) -> anyhow::Result<()> {
    client.revoke_permission(user_id, connection_id).await?;
    let mut out = io::stdout();
    writeln!(
        out,
        "User {} may no longer query connection {}",
        user_id, connection_id
    )?;
    Ok(())
}

fn print_permissions(permissions: &[Permission]) -> anyhow::Result<()> {
    let mut out = io::stdout();
    if permissions.is_empty() {
        writeln!(out, "No grants")?;
        return Ok(());
    }
    writeln!(out, "{:<6} {:<8} {}", "ID", "USER", "CONNECTION")?;
    for p in permissions {
        writeln!(out, "{:<6} {:<8} {}", p.id, p.user_id, p.connection_id)?;
    }
    Ok(())
}
