//! `QueryPilot` Core Library
//!
//! Shared functionality for `QueryPilot` components:
//! - Identity and role model
//! - Connection registry types
//! - Typed tabular query results
//! - Wire types for the HTTP JSON API
//! - Common error types

pub mod connection;
pub mod db;
pub mod error;
pub mod identity;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod table;
pub mod tracing_init;
pub mod wire;

pub use connection::{Connection, DatabaseKind};
pub use error::{ApiError, Error, Result};
pub use identity::{SessionUser, UserIdentity, UserRole};
pub use table::{CellValue, TableResult};
