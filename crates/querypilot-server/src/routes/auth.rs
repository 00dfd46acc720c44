//! Authentication endpoints.

use axum::Json;
use axum::extract::State;
use tracing::{info, warn};

use querypilot_core::UserRole;
use querypilot_core::wire::{AuthRequest, AuthResponse};

use crate::auth::password::{hash_password, validate_credentials, verify_password};
use crate::error::ApiError;
use crate::routes::AppState;
use crate::storage::{DatabaseError, User};

/// `POST /api/v1/auth/register`
///
/// New users start as analysts and are logged in right away.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_credentials(&req.username, &req.password).map_err(ApiError::BadRequest)?;

    if state.db.get_user_by_username(&req.username).await.is_ok() {
        return Err(ApiError::BadRequest("Username already taken".into()));
    }

    let hash = hash_password(&req.password)
        .map_err(|_| ApiError::Internal("Failed to hash password".into()))?;
    let user = state
        .db
        .create_user(&req.username, &hash, UserRole::Analyst)
        .await?;
    info!(username = %user.username, "User registered");

    respond_with_token(&state, &user)
}

/// `POST /api/v1/auth/login`
///
/// Unknown usernames and wrong passwords answer identically.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = match state.db.get_user_by_username(&req.username).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound(_)) => return Err(invalid_credentials(&req.username)),
        Err(other) => return Err(other.into()),
    };

    if !verify_password(&req.password, &user.password_hash).unwrap_or(false) {
        return Err(invalid_credentials(&req.username));
    }

    respond_with_token(&state, &user)
}

fn invalid_credentials(username: &str) -> ApiError {
    warn!(username, "Failed login attempt");
    ApiError::Unauthenticated("Invalid credentials".into())
}

fn respond_with_token(state: &AppState, user: &User) -> Result<Json<AuthResponse>, ApiError> {
    let identity = user.identity()?;
    let token = state
        .jwt
        .issue(identity.id, &identity.username)
        .map_err(|_| ApiError::Internal("Failed to issue token".into()))?;
    Ok(Json(AuthResponse {
        token,
        username: identity.username,
        role: identity.role,
    }))
}
