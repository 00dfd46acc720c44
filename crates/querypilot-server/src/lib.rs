//! `QueryPilot` API server library.
//!
//! Serves the `/api/v1` JSON API: authentication, the admin-managed
//! connection registry, query permissions, and the access-gated question
//! endpoint. SQL generation and execution live behind the [`engine`]
//! collaborator.

pub mod auth;
pub mod engine;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod routes;
pub mod storage;

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_helpers;
