//! Route wiring for the `/api/v1` JSON API.

pub mod admin_connections;
pub mod admin_permissions;
pub mod auth;
pub mod query;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use crate::auth::JwtManager;
use crate::engine::QueryEngine;
use crate::gateway::AccessGateway;
use crate::storage::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub gateway: AccessGateway,
    pub engine: Arc<dyn QueryEngine>,
}

/// Build the full API router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route(
            "/admin/connections",
            get(admin_connections::list).post(admin_connections::create),
        )
        .route(
            "/admin/connections/{id}",
            get(admin_connections::get_one).delete(admin_connections::remove),
        )
        .route(
            "/admin/connections/{id}/refresh-schema",
            post(admin_connections::refresh_schema),
        )
        .route(
            "/admin/permissions",
            post(admin_permissions::grant).delete(admin_permissions::revoke),
        )
        .route(
            "/admin/permissions/user/{user_id}",
            get(admin_permissions::for_user),
        )
        .route(
            "/admin/permissions/connection/{connection_id}",
            get(admin_permissions::for_connection),
        )
        .route("/query/connections", get(query::connections))
        .route("/query/ask", post(query::ask))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api)
        .layer(CorsLayer::permissive())
}
