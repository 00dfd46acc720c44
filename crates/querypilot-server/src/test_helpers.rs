//! Shared test helpers for server test modules.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::engine::StaticEngine;
use crate::gateway::AccessGateway;
use crate::routes::AppState;
use crate::storage::Database;

/// Build an `AppState` over an in-memory database and a canned engine
/// that passes every safety check.
pub async fn test_state() -> AppState {
    state_with_engine(StaticEngine {
        sql: "SELECT 1".into(),
        safety_check: "PASSED".into(),
        ..StaticEngine::default()
    })
    .await
}

/// Build an `AppState` over an in-memory database and the given engine.
pub async fn state_with_engine(engine: StaticEngine) -> AppState {
    let db = Database::open_in_memory().await.unwrap();
    AppState {
        db: db.clone(),
        jwt: Arc::new(JwtManager::new(b"test-secret", 3600)),
        gateway: AccessGateway::new(db),
        engine: Arc::new(engine),
    }
}
