//! QueryPilot CLI
//!
//! Command-line client for a QueryPilot server: manage the session,
//! administer connections and grants, and ask natural-language questions.

use std::io::{self, Write};

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use querypilot_core::ApiError;

use querypilot_cli::auth_cmd::{self, AuthAction};
use querypilot_cli::config::CliConfig;
use querypilot_cli::connection_cmd::{self, ConnectionAction};
use querypilot_cli::permission_cmd::{self, PermissionAction};
use querypilot_cli::query_cmd::{self, QueryAction};

#[derive(Parser, Debug)]
#[command(name = "querypilot")]
#[command(version, about = "Ask your databases questions in plain language", long_about = None)]
struct Cli {
    /// Server URL (overrides the configured one)
    #[arg(long, env = "QUERYPILOT_SERVER")]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage the stored session.
    #[command(subcommand)]
    Auth(AuthAction),
    /// Administer database connections (admin).
    #[command(subcommand)]
    Connection(ConnectionAction),
    /// Administer query grants (admin).
    #[command(subcommand)]
    Permission(PermissionAction),
    /// Ask questions against a connection.
    #[command(subcommand)]
    Query(QueryAction),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "querypilot=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting querypilot CLI");

    let mut config = CliConfig::load();
    if let Some(server) = cli.server {
        config.server_url = Some(server);
    }

    // Auth commands manage the session themselves: a failed login must not
    // clear a session it never replaced.
    let is_auth_command = matches!(cli.command, Commands::Auth(_));

    let result = match cli.command {
        Commands::Auth(action) => auth_cmd::run(action, &mut config).await,
        Commands::Connection(action) => connection_cmd::run(action, &config).await,
        Commands::Permission(action) => permission_cmd::run(action, &config).await,
        Commands::Query(action) => query_cmd::run(action, &config).await,
    };

    if !is_auth_command {
        if let Err(err) = &result {
            expire_session_if_needed(err, &mut config);
        }
    }

    result
}

/// On an authentication failure, drop the stored session exactly once and
/// tell the user. The failed command is never retried.
fn expire_session_if_needed(err: &anyhow::Error, config: &mut CliConfig) {
    let expired = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ApiError>())
        .any(ApiError::expires_session);
    if expired && config.clear_session() {
        if let Err(save_err) = config.save() {
            tracing::warn!(error = %save_err, "Could not persist the cleared session");
        }
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "Session expired. Run: querypilot auth login");
    }
}
