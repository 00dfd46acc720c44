//! Connection administration subcommands. These require the admin role.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use dialoguer::Password;

use querypilot_core::DatabaseKind;
use querypilot_core::wire::CreateConnectionRequest;

use crate::client::{ApiClient, authed_client};
use crate::config::CliConfig;

/// Connection subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum ConnectionAction {
    /// List registered connections.
    List,
    /// Show one connection, including its cached schema DDL.
    Get {
        /// Connection ID.
        id: i64,
    },
    /// Register a database connection.
    Add {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Database type: MYSQL, POSTGRESQL or H2.
        #[arg(long = "type", value_parser = parse_kind)]
        kind: DatabaseKind,
        /// URL of the database.
        #[arg(long)]
        url: String,
        /// Username the server connects with.
        #[arg(long)]
        username: String,
        /// Password. Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete a connection along with its grants.
    Remove {
        /// Connection ID.
        id: i64,
    },
    /// Re-fetch the schema DDL from the database.
    RefreshSchema {
        /// Connection ID.
        id: i64,
    },
}

/// Execute a connection subcommand.
pub async fn run(action: ConnectionAction, config: &CliConfig) -> anyhow::Result<()> {
    let client = authed_client(config)?;
    match action {
        ConnectionAction::List => list(&client).await,
        ConnectionAction::Get { id } => get(&client, id).await,
        ConnectionAction::Add {
            name,
            kind,
            url,
            username,
            password,
        } => add(&client, name, kind, url, username, password).await,
        ConnectionAction::Remove { id } => remove(&client, id).await,
        ConnectionAction::RefreshSchema { id } => refresh_schema(&client, id).await,
    }
}

fn parse_kind(s: &str) -> Result<DatabaseKind, String> {
    s.parse().map_err(|e: querypilot_core::Error| e.to_string())
}

async fn list(client: &ApiClient) -> anyhow::Result<()> {
    let connections = client.list_connections().await?;
    let mut out = io::stdout();
    if connections.is_empty() {
        writeln!(out, "No connections registered")?;
        return Ok(());
    }
    writeln!(out, "{:<5} {:<20} {:<12} {}", "ID", "NAME", "TYPE", "URL")?;
    for c in &connections {
        writeln!(out, "{:<5} {:<20} {:<12} {}", c.id, c.name, c.kind, c.url)?;
    }
    Ok(())
}

async fn get(client: &ApiClient, id: i64) -> anyhow::Result<()> {
    let c = client.get_connection(id).await?;
    let mut out = io::stdout();
    writeln!(out, "ID: {}", c.id)?;
    writeln!(out, "Name: {}", c.name)?;
    writeln!(out, "Type: {}", c.kind)?;
    writeln!(out, "URL: {}", c.url)?;
    writeln!(out, "Username: {}", c.username)?;
    match &c.schema_ddl {
        Some(ddl) => writeln!(out, "Schema DDL:\n{}", ddl)?,
        None => writeln!(out, "Schema DDL: (not fetched)")?,
    }
    Ok(())
}

async fn add(
    client: &ApiClient,
    name: String,
    kind: DatabaseKind,
    url: String,
    username: String,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => Password::new().with_prompt("Database password").interact()?,
    };
    let created = client
        .create_connection(&CreateConnectionRequest {
            name,
            kind,
            url,
            username,
            password,
        })
        .await?;
    let mut out = io::stdout();
    writeln!(out, "Connection {} registered: {}", created.id, created.name)?;
    // Schema fetch at registration is best-effort; tell the admin when it failed.
    if created.schema_ddl.is_none() {
        writeln!(
            out,
            "Schema not fetched. Run: querypilot connection refresh-schema {}",
            created.id
        )?;
    }
    Ok(())
}

async fn remove(client: &ApiClient, id: i64) -> anyhow::Result<()> {
    client.delete_connection(id).await?;
    let mut out = io::stdout();
    writeln!(out, "Connection {} deleted", id)?;
    Ok(())
}

async fn refresh_schema(client: &ApiClient, id: i64) -> anyhow::Result<()> {
    let c = client.refresh_schema(id).await?;
    let mut out = io::stdout();
    match &c.schema_ddl {
        Some(ddl) => writeln!(out, "Schema refreshed:\n{}", ddl)?,
        None => writeln!(out, "Schema refreshed")?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_flag_reports_parse_errors_as_plain_strings() {
        assert_eq!(parse_kind("mysql").unwrap(), DatabaseKind::Mysql);
        let message = parse_kind("oracle").unwrap_err();
        assert!(message.contains("Unknown database type"));
    }
}
