//! CLI configuration management.
//!
//! Persists the server URL and the current session (bearer token plus the
//! identity it was issued to) to `~/.querypilot/config.json`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use querypilot_core::{SessionUser, UserRole};

/// Persistent CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Server URL (e.g., "<http://localhost:8080>").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// The current session. Replaced wholesale on login, dropped wholesale
    /// on logout or on an authentication failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionConfig>,
}

/// A stored session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub username: String,
    pub role: UserRole,
    pub token: String,
}

impl CliConfig {
    /// Path to the config directory: `~/.querypilot/`.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".querypilot"))
    }

    /// Path to the config file: `~/.querypilot/config.json`.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.json"))
    }

    /// Load config from disk. Returns default if file doesn't exist or is invalid.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let dir =
            Self::config_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("config.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Drop the stored session. Returns whether one existed, so callers
    /// clear at most once.
    pub fn clear_session(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Whether a session is stored. Authentication status is derived from
    /// this, never persisted as its own flag.
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The identity attached to the stored session.
    pub fn session_user(&self) -> Option<SessionUser> {
        self.session.as_ref().map(|s| SessionUser {
            username: s.username.clone(),
            role: s.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_session() -> SessionConfig {
        SessionConfig {
            username: "alice".into(),
            role: UserRole::Analyst,
            token: "jwt-token".into(),
        }
    }

    #[test]
    fn default_config_is_logged_out() {
        let cfg = CliConfig::default();
        assert!(!cfg.is_authenticated());
        assert!(cfg.session_user().is_none());
        assert!(cfg.server_url.is_none());
    }

    #[test]
    fn config_roundtrip_json() {
        let cfg = CliConfig {
            server_url: Some("http://localhost:8080".into()),
            session: Some(sample_session()),
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let loaded: CliConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.server_url.unwrap(), "http://localhost:8080");
        assert_eq!(loaded.session.unwrap().username, "alice");
    }

    #[test]
    fn session_is_omitted_from_json_when_absent() {
        let cfg = CliConfig {
            server_url: Some("http://localhost:8080".into()),
            session: None,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("session"), "got: {json}");
    }

    #[test]
    fn clear_session_reports_whether_one_existed() {
        let mut cfg = CliConfig {
            session: Some(sample_session()),
            ..Default::default()
        };
        assert!(cfg.clear_session());
        // Already cleared: a second clear is a no-op.
        assert!(!cfg.clear_session());
        assert!(!cfg.is_authenticated());
    }

    #[test]
    fn session_user_derives_admin_from_the_role() {
        let mut cfg = CliConfig {
            session: Some(sample_session()),
            ..Default::default()
        };
        assert!(!cfg.session_user().unwrap().is_admin());

        cfg.session = Some(SessionConfig {
            role: UserRole::Admin,
            ..sample_session()
        });
        assert!(cfg.session_user().unwrap().is_admin());
    }

    #[test]
    fn config_path_contains_querypilot() {
        if let Some(path) = CliConfig::config_path() {
            assert!(path.to_string_lossy().contains(".querypilot"));
            assert!(path.to_string_lossy().contains("config.json"));
        }
    }
}
