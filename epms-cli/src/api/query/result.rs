//! OData V4 response envelope parsing

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const VALUE_KEY: &str = "value";
pub const COUNT_KEY: &str = "@odata.count";

/// One page of rows plus the server-side total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult<T = Value> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> QueryResult<T> {
    pub fn new(rows: Vec<T>, total: u64) -> Self {
        Self { rows, total }
    }

    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl<T> Default for QueryResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// A row that did not match the collection's schema
#[derive(Debug, thiserror::Error)]
#[error("row {index} does not match the expected schema: {source}")]
pub struct RowDecodeError {
    pub index: usize,
    pub source: serde_json::Error,
}

impl QueryResult<Value> {
    /// Validate every row against `T`. The first mismatch fails the whole page.
    pub fn decode<T: DeserializeOwned>(self) -> Result<QueryResult<T>, RowDecodeError> {
        let total = self.total;
        let rows = decode_rows(self.rows)?;
        Ok(QueryResult { rows, total })
    }
}

/// Decode untyped rows into `T`, reporting the index of the first bad row
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, RowDecodeError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row).map_err(|source| RowDecodeError { index, source })
        })
        .collect()
}

/// Unwrap `{ "@odata.count": n, "value": [...] }`.
///
/// Never fails: a missing or non-array `value` yields no rows, and a missing
/// or invalid count falls back to the number of rows received.
pub fn parse_odata_response(body: &Value) -> QueryResult<Value> {
    let rows = parse_selection_response(body);
    let total = body
        .get(COUNT_KEY)
        .and_then(count_from_value)
        .unwrap_or(rows.len() as u64);
    QueryResult { rows, total }
}

/// Rows of an envelope fetched without `$count`
pub fn parse_selection_response(body: &Value) -> Vec<Value> {
    match body.get(VALUE_KEY) {
        Some(Value::Array(rows)) => rows.clone(),
        _ => Vec::new(),
    }
}

fn count_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        _ => None,
    }
}
