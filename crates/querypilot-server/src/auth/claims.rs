//! JWT claims structure for `QueryPilot` access tokens.

use serde::{Deserialize, Serialize};

/// JWT claims embedded in access tokens.
///
/// Deliberately carries no role: the caller's role is re-read from storage
/// on every request, so a role change takes effect immediately instead of
/// at token expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per token).
    pub jti: String,
    /// Subject (user id, decimal).
    pub sub: String,
    /// Username at issue time.
    pub username: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Parse the subject back into a user id.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn user_id_parses_decimal_subject() {
        let claims = Claims {
            jti: "j".into(),
            sub: "42".into(),
            username: "alice".into(),
            iat: 0,
            exp: 0,
        };
        assert_eq!(claims.user_id(), Some(42));
    }

    #[test]
    fn user_id_rejects_garbage_subject() {
        let claims = Claims {
            jti: "j".into(),
            sub: "not-a-number".into(),
            username: "alice".into(),
            iat: 0,
            exp: 0,
        };
        assert_eq!(claims.user_id(), None);
    }
}
