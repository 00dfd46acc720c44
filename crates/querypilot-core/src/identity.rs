//! Identity and role model.
//!
//! Roles are fixed at two tiers. Authorization flags (`is_admin`,
//! `is_authenticated`) are always derived from the role or the presence
//! of a token, never stored as separate booleans.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Role assigned to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// May query only connections explicitly granted to them.
    Analyst,
    /// May query every connection and manage the registry and grants.
    Admin,
}

impl UserRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Analyst => "ANALYST",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANALYST" => Ok(Self::Analyst),
            "ADMIN" => Ok(Self::Admin),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

/// A resolved caller identity on the server side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

impl UserIdentity {
    /// Whether this identity holds the ADMIN role.
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// Identity snapshot carried by a client session.
///
/// The id stays server-side; the token is the session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    pub role: UserRole,
}

impl SessionUser {
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}
