//! NL-to-SQL engine client.
//!
//! The server never inspects questions or SQL itself. It forwards the
//! question plus the target connection to the engine service and carries
//! the answer back verbatim, safety verdict included.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use querypilot_core::table::JsonRow;

use crate::storage::ConnectionRow;

/// Engine client errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Engine error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// What the engine produced for one question.
///
/// `safety_check` is opaque to the server: `"PASSED"` or warning text,
/// forwarded unmodified either way.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineAnswer {
    pub sql: String,
    #[serde(default)]
    pub rows: Vec<JsonRow>,
    pub safety_check: String,
}

/// Turns questions into executed SQL against a registered connection.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Answer a natural-language question against the given connection.
    async fn ask(&self, connection: &ConnectionRow, question: &str)
    -> Result<EngineAnswer, EngineError>;

    /// Introspect the connection's schema and return it as DDL text.
    async fn fetch_schema(&self, connection: &ConnectionRow) -> Result<String, EngineError>;
}

/// Target database details shipped to the engine with every call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetPayload<'a> {
    url: &'a str,
    database_type: &'a str,
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_ddl: Option<&'a str>,
}

impl<'a> TargetPayload<'a> {
    fn from_row(row: &'a ConnectionRow) -> Self {
        Self {
            url: &row.url,
            database_type: &row.db_type,
            username: &row.username,
            password: &row.password,
            schema_ddl: row.schema_ddl.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AskPayload<'a> {
    question: &'a str,
    #[serde(flatten)]
    target: TargetPayload<'a>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaAnswer {
    schema_ddl: String,
}

/// HTTP client for the engine service.
#[derive(Debug)]
pub struct HttpQueryEngine {
    http: reqwest::Client,
    base_url: String,
}

impl HttpQueryEngine {
    pub fn new(base_url: &str) -> Result<Self, EngineError> {
        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder().build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-success response into an error, keeping the body as the
    /// message when the engine sent one.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, EngineError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = match resp.text().await {
            Ok(body) if !body.trim().is_empty() => body,
            _ => status.canonical_reason().unwrap_or("Unknown").into(),
        };
        Err(EngineError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl QueryEngine for HttpQueryEngine {
    async fn ask(
        &self,
        connection: &ConnectionRow,
        question: &str,
    ) -> Result<EngineAnswer, EngineError> {
        let payload = AskPayload {
            question,
            target: TargetPayload::from_row(connection),
        };
        let resp = self
            .http
            .post(self.endpoint("/ask"))
            .json(&payload)
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json().await?)
    }

    async fn fetch_schema(&self, connection: &ConnectionRow) -> Result<String, EngineError> {
        let payload = TargetPayload::from_row(connection);
        let resp = self
            .http
            .post(self.endpoint("/schema"))
            .json(&payload)
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        let answer: SchemaAnswer = resp.json().await?;
        Ok(answer.schema_ddl)
    }
}

/// Engine that answers every question with the same canned response.
///
/// Used by the test suite; also handy for demoing the server without a
/// live engine.
#[derive(Debug, Clone, Default)]
pub struct StaticEngine {
    pub sql: String,
    pub rows: Vec<JsonRow>,
    pub safety_check: String,
    pub schema_ddl: String,
    /// When set, every call fails with this message instead.
    pub fail_message: Option<String>,
}

impl StaticEngine {
    fn fail(&self) -> Option<EngineError> {
        self.fail_message.as_ref().map(|message| EngineError::Api {
            status: 500,
            message: message.clone(),
        })
    }
}

#[async_trait]
impl QueryEngine for StaticEngine {
    async fn ask(
        &self,
        _connection: &ConnectionRow,
        _question: &str,
    ) -> Result<EngineAnswer, EngineError> {
        if let Some(err) = self.fail() {
            return Err(err);
        }
        Ok(EngineAnswer {
            sql: self.sql.clone(),
            rows: self.rows.clone(),
            safety_check: self.safety_check.clone(),
        })
    }

    async fn fetch_schema(&self, _connection: &ConnectionRow) -> Result<String, EngineError> {
        if let Some(err) = self.fail() {
            return Err(err);
        }
        Ok(self.schema_ddl.clone())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> ConnectionRow {
        ConnectionRow {
            id: 1,
            name: "Sales DB".into(),
            db_type: "MYSQL".into(),
            url: "jdbc:mysql://db:3306/sales".into(),
            username: "reader".into(),
            password: "hunter2".into(),
            schema_ddl: Some("CREATE TABLE orders (id INT);".into()),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn ask_payload_uses_wire_names() {
        let row = sample_row();
        let payload = AskPayload {
            question: "top customers?",
            target: TargetPayload::from_row(&row),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["question"], "top customers?");
        assert_eq!(json["databaseType"], "MYSQL");
        assert_eq!(json["schemaDdl"], "CREATE TABLE orders (id INT);");
    }

    #[test]
    fn ask_payload_omits_missing_schema() {
        let mut row = sample_row();
        row.schema_ddl = None;
        let json = serde_json::to_value(TargetPayload::from_row(&row)).unwrap();
        assert!(json.get("schemaDdl").is_none());
    }

    #[test]
    fn engine_answer_parses_wire_shape() {
        let answer: EngineAnswer = serde_json::from_value(json!({
            "sql": "SELECT 1",
            "rows": [{"n": 1}],
            "safetyCheck": "PASSED",
        }))
        .unwrap();
        assert_eq!(answer.sql, "SELECT 1");
        assert_eq!(answer.rows.len(), 1);
        assert_eq!(answer.safety_check, "PASSED");
    }

    #[tokio::test]
    async fn static_engine_returns_its_canned_answer() {
        let engine = StaticEngine {
            sql: "SELECT 1".into(),
            safety_check: "PASSED".into(),
            ..StaticEngine::default()
        };
        let answer = engine.ask(&sample_row(), "anything").await.unwrap();
        assert_eq!(answer.sql, "SELECT 1");
    }

    #[tokio::test]
    async fn static_engine_failure_mode() {
        let engine = StaticEngine {
            fail_message: Some("model offline".into()),
            ..StaticEngine::default()
        };
        let err = engine.ask(&sample_row(), "anything").await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Api { status: 500, message } if message == "model offline"
        ));
    }
}
