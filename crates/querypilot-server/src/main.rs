//! `QueryPilot` API Server
//!
//! HTTP JSON API for authentication, the connection registry, query
//! permissions, and access-gated natural-language queries.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use querypilot_core::UserRole;
use querypilot_core::tracing_init::init_tracing;
use querypilot_server::auth::JwtManager;
use querypilot_server::auth::password::hash_password;
use querypilot_server::engine::HttpQueryEngine;
use querypilot_server::gateway::AccessGateway;
use querypilot_server::routes::{AppState, build_router};
use querypilot_server::storage::{Database, DatabaseError};

#[derive(Parser, Debug)]
#[command(name = "querypilot-server")]
#[command(
    version,
    about = "QueryPilot API server - connection registry, permissions, and query gateway"
)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080", env = "QUERYPILOT_ADDR")]
    addr: SocketAddr,

    /// Path to SQLite database file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// JWT secret key.
    #[arg(
        long,
        env = "QUERYPILOT_JWT_SECRET",
        default_value = "dev-secret-change-me"
    )]
    jwt_secret: String,

    /// Access token TTL in seconds.
    #[arg(long, default_value_t = 86_400)]
    token_ttl: i64,

    /// Base URL of the NL-to-SQL engine service.
    #[arg(
        long,
        env = "QUERYPILOT_ENGINE_URL",
        default_value = "http://127.0.0.1:8090"
    )]
    engine_url: String,

    /// Username of the bootstrap admin account.
    #[arg(long, env = "QUERYPILOT_ADMIN_USERNAME")]
    admin_username: Option<String>,

    /// Password of the bootstrap admin account.
    #[arg(long, env = "QUERYPILOT_ADMIN_PASSWORD")]
    admin_password: Option<String>,

    /// OTLP endpoint for metrics export.
    #[cfg(feature = "metrics")]
    #[arg(long, env = "QUERYPILOT_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing("querypilot_server=info", args.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        "Starting querypilot-server"
    );

    #[cfg(feature = "metrics")]
    let _metrics_guard = match &args.otlp_endpoint {
        Some(endpoint) => match querypilot_core::metrics::init_metrics(endpoint) {
            Ok(guard) => Some(guard),
            Err(e) => {
                tracing::warn!(error = %e, "Metrics init failed; continuing without metrics");
                None
            }
        },
        None => None,
    };

    let db = match &args.db_path {
        Some(path) => {
            info!(path = %path.display(), "Opening database");
            Database::open(path).await?
        }
        None => {
            let default_path = default_db_path()?;
            info!(path = %default_path.display(), "Opening database (default path)");
            Database::open(&default_path).await?
        }
    };

    bootstrap_admin(
        &db,
        args.admin_username.as_deref(),
        args.admin_password.as_deref(),
    )
    .await?;

    let jwt = Arc::new(JwtManager::new(args.jwt_secret.as_bytes(), args.token_ttl));
    let engine = Arc::new(HttpQueryEngine::new(&args.engine_url)?);
    let gateway = AccessGateway::new(db.clone());

    let app = build_router(AppState {
        db,
        jwt,
        gateway,
        engine,
    });

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(addr = %args.addr, "API server listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Ensure the configured admin account exists and holds the admin role.
///
/// No-op when the flags are absent. An existing user with the same
/// username is promoted rather than recreated; the stored password is
/// left alone in that case.
async fn bootstrap_admin(
    db: &Database,
    username: Option<&str>,
    password: Option<&str>,
) -> anyhow::Result<()> {
    let (Some(username), Some(password)) = (username, password) else {
        return Ok(());
    };

    match db.get_user_by_username(username).await {
        Ok(user) => {
            if user.role != UserRole::Admin.as_str() {
                db.set_user_role(user.id, UserRole::Admin).await?;
                info!(username, "Existing user promoted to admin");
            }
        }
        Err(DatabaseError::NotFound(_)) => {
            let hash = hash_password(password)
                .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;
            db.create_user(username, &hash, UserRole::Admin).await?;
            info!(username, "Bootstrap admin created");
        }
        Err(other) => return Err(other.into()),
    }

    Ok(())
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".querypilot").join("server.db"))
}
