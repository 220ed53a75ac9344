//! Shapes for the `query` operation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query against a table the host loaded from the sync payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryInput {
    /// Table name (one of the payload's `tables`)
    pub table: String,
    /// Column equality filter
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub filter: Map<String, Value>,
    /// Maximum rows to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl QueryInput {
    /// Query every row of `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: Map::new(),
            limit: None,
        }
    }

    /// Require `column == value`.
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(column.into(), value.into());
        self
    }

    /// Cap the number of returned rows.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Rows returned by the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryOutput {
    /// One JSON object per row
    pub rows: Vec<Map<String, Value>>,
}
