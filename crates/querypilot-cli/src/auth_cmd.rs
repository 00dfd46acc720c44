//! Auth subcommands: login, register, logout, status.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use dialoguer::Password;

use querypilot_core::wire::AuthResponse;

use crate::client::{DEFAULT_SERVER_URL, open_client};
use crate::config::{CliConfig, SessionConfig};

/// Auth subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AuthAction {
    /// Log in and store the session.
    Login {
        /// Username.
        #[arg(short, long)]
        username: String,
        /// Password. Prompted for when omitted.
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an analyst account and log in.
    Register {
        /// Username (at least 3 characters).
        #[arg(short, long)]
        username: String,
        /// Password (at least 8 characters). Prompted for when omitted.
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Drop the stored session.
    Logout,
    /// Show the current session.
    Status,
}

/// Execute an auth subcommand.
pub async fn run(action: AuthAction, config: &mut CliConfig) -> anyhow::Result<()> {
    match action {
        AuthAction::Login { username, password } => login(config, &username, password).await,
        AuthAction::Register { username, password } => register(config, &username, password).await,
        AuthAction::Logout => logout(config),
        AuthAction::Status => {
            status(config);
            Ok(())
        }
    }
}

async fn login(
    config: &mut CliConfig,
    username: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = password_or_prompt(password)?;
    let client = open_client(config)?;
    let resp = client.login(username, &password).await?;
    store_session(config, resp)
}

async fn register(
    config: &mut CliConfig,
    username: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = password_or_prompt(password)?;
    let client = open_client(config)?;
    let resp = client.register(username, &password).await?;
    store_session(config, resp)
}

/// Replace the stored session wholesale with the one just issued.
fn store_session(config: &mut CliConfig, resp: AuthResponse) -> anyhow::Result<()> {
    let username = resp.username;
    let role = resp.role;
    config.session = Some(SessionConfig {
        username: username.clone(),
        role,
        token: resp.token,
    });
    config.save()?;
    let mut out = io::stdout();
    writeln!(out, "Logged in as {} ({})", username, role)?;
    Ok(())
}

fn logout(config: &mut CliConfig) -> anyhow::Result<()> {
    // Tokens are stateless, so logout is purely local.
    config.clear_session();
    config.save()?;
    let mut out = io::stdout();
    writeln!(out, "Logged out")?;
    Ok(())
}

fn status(config: &CliConfig) {
    let mut out = io::stdout();
    match config.session_user() {
        Some(user) => {
            let _ = writeln!(out, "Logged in as: {} ({})", user.username, user.role);
            let _ = writeln!(
                out,
                "Server: {}",
                config.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
            );
        }
        None => {
            let _ = writeln!(out, "Not logged in");
        }
    }
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => Ok(Password::new().with_prompt("Password").interact()?),
    }
}
