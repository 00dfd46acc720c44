//! HTTP client for the `QueryPilot` API.
//!
//! Thin wrapper over reqwest that attaches the bearer token, parses the
//! server's error envelope, and folds every failure into the
//! [`ApiError`] taxonomy.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use querypilot_core::wire::{
    AskRequest, AskResponse, AuthRequest, AuthResponse, CreateConnectionRequest, ErrorBody,
    GrantPermissionRequest, Permission,
};
use querypilot_core::{ApiError, Connection};

use crate::config::CliConfig;

/// Server URL used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// QueryPilot API client.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client without a session (login and register only).
    pub fn new(server_url: &str) -> Result<Self, ApiError> {
        Self::build(server_url, None)
    }

    /// Create a client that sends the given bearer token with every request.
    pub fn with_token(server_url: &str, token: &str) -> Result<Self, ApiError> {
        Self::build(server_url, Some(token))
    }

    fn build(server_url: &str, token: Option<&str>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Validation("Stored token is malformed".into()))?;
            headers.insert(AUTHORIZATION, value);
        }

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(transport)?;

        Ok(Self {
            http,
            base_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the full URL for an API path.
    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    /// Turn a non-success response into the matching `ApiError`, using the
    /// server's error envelope when one was sent.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("Unknown").to_string(),
        };
        Err(classify(status, message))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .http
            .get(self.api_url(path))
            .send()
            .await
            .map_err(transport)?;
        let resp = Self::check(resp).await?;
        resp.json().await.map_err(transport)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(self.api_url(path))
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        let resp = Self::check(resp).await?;
        resp.json().await.map_err(transport)
    }

    async fn post_no_body<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .http
            .post(self.api_url(path))
            .send()
            .await
            .map_err(transport)?;
        let resp = Self::check(resp).await?;
        resp.json().await.map_err(transport)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.api_url(path))
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp).await?;
        Ok(())
    }

    // ===== Auth =====

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post_json(
            "/auth/login",
            &AuthRequest {
                username: username.into(),
                password: password.into(),
            },
        )
        .await
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post_json(
            "/auth/register",
            &AuthRequest {
                username: username.into(),
                password: password.into(),
            },
        )
        .await
    }

    // ===== Connection administration =====

    pub async fn list_connections(&self) -> Result<Vec<Connection>, ApiError> {
        self.get_json("/admin/connections").await
    }

    pub async fn get_connection(&self, id: i64) -> Result<Connection, ApiError> {
        self.get_json(&format!("/admin/connections/{id}")).await
    }

    pub async fn create_connection(
        &self,
        req: &CreateConnectionRequest,
    ) -> Result<Connection, ApiError> {
        self.post_json("/admin/connections", req).await
    }

    pub async fn delete_connection(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/admin/connections/{id}")).await
    }

    pub async fn refresh_schema(&self, id: i64) -> Result<Connection, ApiError> {
        self.post_no_body(&format!("/admin/connections/{id}/refresh-schema"))
            .await
    }

    // ===== Permission administration =====

    pub async fn grant_permission(
        &self,
        user_id: i64,
        connection_id: i64,
    ) -> Result<Permission, ApiError> {
        self.post_json(
            "/admin/permissions",
            &GrantPermissionRequest {
                user_id,
                connection_id,
            },
        )
        .await
    }

    pub async fn revoke_permission(
        &self,
        user_id: i64,
        connection_id: i64,
    ) -> Result<(), ApiError> {
        self.delete(&format!(
            "/admin/permissions?userId={user_id}&connectionId={connection_id}"
        ))
        .await
    }

    pub async fn permissions_for_user(&self, user_id: i64) -> Result<Vec<Permission>, ApiError> {
        self.get_json(&format!("/admin/permissions/user/{user_id}"))
            .await
    }

    pub async fn permissions_for_connection(
        &self,
        connection_id: i64,
    ) -> Result<Vec<Permission>, ApiError> {
        self.get_json(&format!("/admin/permissions/connection/{connection_id}"))
            .await
    }

    // ===== Queries =====

    /// The connections the current session may query.
    pub async fn query_connections(&self) -> Result<Vec<Connection>, ApiError> {
        self.get_json("/query/connections").await
    }

    /// Submit a question against a connection.
    pub async fn ask(&self, connection_id: i64, question: &str) -> Result<AskResponse, ApiError> {
        self.post_json(
            "/query/ask",
            &AskRequest {
                connection_id,
                question: question.into(),
            },
        )
        .await
    }
}

/// Client for the configured server, without a session.
pub fn open_client(config: &CliConfig) -> anyhow::Result<ApiClient> {
    Ok(ApiClient::new(server_url(config))?)
}

/// Client that sends the stored session token.
pub fn authed_client(config: &CliConfig) -> anyhow::Result<ApiClient> {
    let session = config
        .session
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run: querypilot auth login"))?;
    Ok(ApiClient::with_token(server_url(config), &session.token)?)
}

fn server_url(config: &CliConfig) -> &str {
    config.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

/// Map an HTTP status to the failure taxonomy.
fn classify(status: StatusCode, message: String) -> ApiError {
    match status.as_u16() {
        401 => ApiError::Authentication(message),
        403 => ApiError::Authorization(message),
        400 | 404 => ApiError::Validation(message),
        _ => ApiError::Execution(message),
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_base_and_path() {
        let client = ApiClient::new("http://localhost:8080/").unwrap();
        assert_eq!(
            client.api_url("/query/ask"),
            "http://localhost:8080/api/v1/query/ask"
        );
    }

    #[test]
    fn statuses_classify_into_the_taxonomy() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, "m".into()),
            ApiError::Authentication(_)
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, "m".into()),
            ApiError::Authorization(_)
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, "m".into()),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, "m".into()),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            classify(StatusCode::BAD_GATEWAY, "m".into()),
            ApiError::Execution(_)
        ));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, "m".into()),
            ApiError::Execution(_)
        ));
    }

    #[test]
    fn only_authentication_failures_expire_the_session() {
        assert!(classify(StatusCode::UNAUTHORIZED, "m".into()).expires_session());
        assert!(!classify(StatusCode::FORBIDDEN, "m".into()).expires_session());
    }

    #[test]
    fn open_client_falls_back_to_the_default_server() {
        let client = open_client(&CliConfig::default()).unwrap();
        assert_eq!(client.api_url(""), format!("{DEFAULT_SERVER_URL}/api/v1"));
    }

    #[test]
    fn authed_client_requires_a_session() {
        let err = authed_client(&CliConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
    }
}
