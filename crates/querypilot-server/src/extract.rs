//! Request authentication extractors.
//!
//! `AuthedUser` validates the bearer token and then re-reads the user row,
//! so handlers always see the caller's current role. A promotion, demotion,
//! or deleted account takes effect on the next request, not at token expiry.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use querypilot_core::UserIdentity;

use crate::error::ApiError;
use crate::routes::AppState;
use crate::storage::DatabaseError;

/// Any authenticated caller.
pub struct AuthedUser(pub UserIdentity);

/// An authenticated caller holding the admin role right now.
pub struct AdminUser(pub UserIdentity);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthenticated("Missing bearer token".into()))
}

impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = state
            .jwt
            .validate(token)
            .map_err(|_| ApiError::Unauthenticated("Invalid or expired token".into()))?;

        let user_id = claims
            .user_id()
            .ok_or_else(|| ApiError::Unauthenticated("Invalid or expired token".into()))?;

        let user = match state.db.get_user(user_id).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound(_)) => {
                return Err(ApiError::Unauthenticated("Unknown user".into()));
            }
            Err(other) => return Err(other.into()),
        };

        Ok(Self(user.identity()?))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthedUser(identity) = AuthedUser::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            return Err(ApiError::Forbidden("Admin access required".into()));
        }
        Ok(Self(identity))
    }
}
