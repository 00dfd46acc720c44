//! Query subcommands: list accessible connections, ask a question.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use querypilot_core::ApiError;

use crate::client::{ApiClient, authed_client};
use crate::config::CliConfig;
use crate::exchange::{ExchangeState, QueryExchange};
use crate::render::format_table;

/// Query subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum QueryAction {
    /// List the connections you may query.
    Connections,
    /// Ask a natural-language question against a connection.
    Ask {
        /// Connection ID.
        connection_id: i64,
        /// The question, in plain language.
        question: String,
    },
}

/// Execute a query subcommand.
pub async fn run(action: QueryAction, config: &CliConfig) -> anyhow::Result<()> {
    let client = authed_client(config)?;
    match action {
        QueryAction::Connections => connections(&client).await,
        QueryAction::Ask {
            connection_id,
            question,
        } => ask(&client, connection_id, &question).await,
    }
}

async fn connections(client: &ApiClient) -> anyhow::Result<()> {
    let connections = client.query_connections().await?;
    let mut out = io::stdout();
    if connections.is_empty() {
        writeln!(out, "No connections available. Ask an admin for a grant.")?;
        return Ok(());
    }
    writeln!(out, "{:<5} {:<20} {:<12} {}", "ID", "NAME", "TYPE", "URL")?;
    for c in &connections {
        writeln!(out, "{:<5} {:<20} {:<12} {}", c.id, c.name, c.kind, c.url)?;
    }
    Ok(())
}

/// Run one full exchange: validate locally, send, render the outcome.
async fn ask(client: &ApiClient, connection_id: i64, question: &str) -> anyhow::Result<()> {
    let mut exchange = QueryExchange::new();
    exchange.select_connection(connection_id);
    // Local validation: a blank question never reaches the server.
    let submission = exchange.submit(question)?;

    let outcome = client
        .ask(submission.connection_id, &submission.question)
        .await;
    // Authentication failures bubble up so the dispatcher clears the session.
    let outcome = match outcome {
        Err(err @ ApiError::Authentication(_)) => return Err(err.into()),
        other => other,
    };
    exchange.resolve(submission.generation, outcome);

    let mut out = io::stdout();
    match exchange.state() {
        ExchangeState::Completed {
            sql,
            table,
            safety_check,
        } => {
            writeln!(out, "SQL: {}", sql)?;
            writeln!(out, "Safety check: {}", safety_check)?;
            writeln!(out, "{}", format_table(table))?;
            if !table.is_empty() {
                let n = table.row_count();
                writeln!(out, "({} {})", n, if n == 1 { "row" } else { "rows" })?;
            }
        }
        ExchangeState::Rejected { message } => {
            writeln!(out, "Access denied: {}", message)?;
        }
        ExchangeState::Failed { message } => {
            writeln!(out, "Query failed: {}", message)?;
        }
        ExchangeState::Idle | ExchangeState::Submitted { .. } => {}
    }
    Ok(())
}
