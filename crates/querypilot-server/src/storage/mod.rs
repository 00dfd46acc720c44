//! SQLite storage for the QueryPilot server.
//!
//! Provides persistence for users, database connections, and query
//! permissions.

mod db;
mod models;
mod queries;

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests;

pub use db::Database;
pub use models::*;
pub use querypilot_core::db::DatabaseError;
