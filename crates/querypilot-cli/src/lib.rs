//! `QueryPilot` CLI Library
//!
//! Talks to the `QueryPilot` API server: session management, connection
//! and permission administration, and natural-language queries with
//! plain-text result tables.

pub mod auth_cmd;
pub mod client;
pub mod config;
pub mod connection_cmd;
pub mod exchange;
pub mod permission_cmd;
pub mod query_cmd;
pub mod render;
