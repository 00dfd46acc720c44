//! Database connection registry types.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Supported target database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DatabaseKind {
    Mysql,
    Postgresql,
    H2,
}

impl DatabaseKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mysql => "MYSQL",
            Self::Postgresql => "POSTGRESQL",
            Self::H2 => "H2",
        }
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DatabaseKind {
    type Err = Error;

    /// Case-insensitive, so CLI flags like `--type mysql` work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MYSQL" => Ok(Self::Mysql),
            "POSTGRESQL" | "POSTGRES" => Ok(Self::Postgresql),
            "H2" => Ok(Self::H2),
            other => Err(Error::UnknownDatabaseKind(other.to_string())),
        }
    }
}

/// A registered database connection as exposed over the API.
///
/// Credentials never appear here: they stay in server storage. The cached
/// schema DDL is present only in admin responses; analyst-facing listings
/// carry `None` and the field is omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DatabaseKind,
    pub url: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_ddl: Option<String>,
}
