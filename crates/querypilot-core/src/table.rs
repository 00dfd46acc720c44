//! Typed tabular query results.
//!
//! The wire carries rows as JSON objects (column name to value). This module
//! converts them into an explicit table: an ordered column list plus row
//! vectors of typed cells. Column order derives from the first row; cells
//! missing from later rows become [`CellValue::Null`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw result row as it appears on the wire.
pub type JsonRow = serde_json::Map<String, Value>;

/// A single typed cell in a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::Text(s.clone()),
            // Composite values don't occur in tabular results; render as JSON.
            other => Self::Text(other.to_string()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A query result with explicit column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TableResult {
    /// Build a table from wire rows.
    ///
    /// Column order comes from the first row. An empty slice yields an
    /// empty table, which is a successful result, not an error.
    pub fn from_rows(rows: &[JsonRow]) -> Self {
        let Some(first) = rows.first() else {
            return Self::default();
        };

        let columns: Vec<String> = first.keys().cloned().collect();
        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| row.get(col).map_or(CellValue::Null, CellValue::from))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows_from(value: Value) -> Vec<JsonRow> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_result_is_an_empty_table() {
        let table = TableResult::from_rows(&[]);
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn column_order_comes_from_the_first_row() {
        let rows = rows_from(json!([
            {"name": "Alice", "age": 30, "active": true},
            {"name": "Bob", "age": 25, "active": false},
        ]));
        let table = TableResult::from_rows(&rows);
        assert_eq!(table.columns, vec!["name", "age", "active"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][0], CellValue::Text("Alice".into()));
        assert_eq!(table.rows[1][2], CellValue::Bool(false));
    }

    #[test]
    fn missing_cells_become_null() {
        let rows = rows_from(json!([
            {"id": 1, "note": "first"},
            {"id": 2},
        ]));
        let table = TableResult::from_rows(&rows);
        assert_eq!(table.rows[1][1], CellValue::Null);
    }

    #[test]
    fn null_and_number_cells_survive() {
        let rows = rows_from(json!([
            {"total": 12.5, "label": null},
        ]));
        let table = TableResult::from_rows(&rows);
        assert_eq!(table.rows[0][0].to_string(), "12.5");
        assert_eq!(table.rows[0][1], CellValue::Null);
        assert_eq!(table.rows[0][1].to_string(), "NULL");
    }

    #[test]
    fn integer_cells_render_without_decimal_point() {
        let rows = rows_from(json!([{"count": 42}]));
        let table = TableResult::from_rows(&rows);
        assert_eq!(table.rows[0][0].to_string(), "42");
    }

    #[test]
    fn cell_values_serialize_as_plain_json() {
        let cells = vec![
            CellValue::Null,
            CellValue::Bool(true),
            CellValue::Number(7.into()),
            CellValue::Text("x".into()),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, "[null,true,7,\"x\"]");
    }
}
