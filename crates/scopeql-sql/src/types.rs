//! Bind values carried alongside generated SQL.
//!
//! Every placeholder in a generated statement corresponds to exactly one
//! `BindValue`, in the order the driver must bind them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// A positional argument for a generated query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BindValue {
    /// NULL value
    Null,
    /// Boolean (BOOLEAN)
    Bool(bool),
    /// Signed 64-bit integer (BIGINT); also used for epoch-second timestamps
    BigInt(i64),
    /// Unsigned 64-bit integer, used for row IDs and owner IDs
    UnsignedBigInt(u64),
    /// Variable-length string (VARCHAR, TEXT)
    Text(String),
    /// JSON document (JSON, JSONB)
    Json(JsonValue),
}

impl BindValue {
    /// Returns the SQL type name for this value.
    pub fn sql_type_name(&self) -> &'static str {
        match self {
            BindValue::Null => "NULL",
            BindValue::Bool(_) => "BOOLEAN",
            BindValue::BigInt(_) => "BIGINT",
            BindValue::UnsignedBigInt(_) => "BIGINT UNSIGNED",
            BindValue::Text(_) => "TEXT",
            BindValue::Json(_) => "JSON",
        }
    }

    /// Bind a timestamp as Unix-epoch seconds.
    pub fn epoch_seconds(ts: DateTime<Utc>) -> Self {
        BindValue::BigInt(ts.timestamp())
    }

    /// Returns true for `BindValue::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, BindValue::Null)
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Null => write!(f, "NULL"),
            BindValue::Bool(v) => write!(f, "{}", v),
            BindValue::BigInt(v) => write!(f, "{}", v),
            BindValue::UnsignedBigInt(v) => write!(f, "{}", v),
            BindValue::Text(v) => write!(f, "{:?}", v),
            BindValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        BindValue::Bool(v)
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        BindValue::BigInt(v)
    }
}

impl From<u64> for BindValue {
    fn from(v: u64) -> Self {
        BindValue::UnsignedBigInt(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::Text(v.to_string())
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        BindValue::Text(v)
    }
}

impl From<JsonValue> for BindValue {
    fn from(v: JsonValue) -> Self {
        BindValue::Json(v)
    }
}

impl From<DateTime<Utc>> for BindValue {
    fn from(v: DateTime<Utc>) -> Self {
        BindValue::epoch_seconds(v)
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(BindValue::Null)
    }
}
