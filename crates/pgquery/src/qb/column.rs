//! Column projections for SELECT.

use crate::error::{DbError, DbResult};
use serde::de::{self, Deserialize, Deserializer};
use std::fmt;

/// One entry of a SELECT column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    /// Rendered verbatim, e.g. `NAME` or `COUNT(*)`.
    Name(String),
    /// Rendered as `<column> AS <alias>`.
    Aliased { column: String, alias: String },
}

impl ColumnSpec {
    pub fn aliased(column: impl Into<String>, alias: impl Into<String>) -> Self {
        ColumnSpec::Aliased {
            column: column.into(),
            alias: alias.into(),
        }
    }

    /// Parse a JSON column spec: a string, or an object with `column` and
    /// `alias` string members. Any other shape is rejected.
    pub fn from_json(json: &serde_json::Value) -> DbResult<Self> {
        match json {
            serde_json::Value::String(name) => Ok(ColumnSpec::Name(name.clone())),
            serde_json::Value::Object(obj) => {
                match (
                    obj.get("column").and_then(|v| v.as_str()),
                    obj.get("alias").and_then(|v| v.as_str()),
                ) {
                    (Some(column), Some(alias)) => Ok(ColumnSpec::aliased(column, alias)),
                    _ => Err(DbError::InvalidColumnSpec(json.to_string())),
                }
            }
            other => Err(DbError::InvalidColumnSpec(other.to_string())),
        }
    }

    /// Render for a SELECT list.
    pub fn render(&self) -> DbResult<String> {
        match self {
            ColumnSpec::Name(name) if !name.trim().is_empty() => Ok(name.clone()),
            ColumnSpec::Aliased { column, alias }
                if !column.trim().is_empty() && !alias.trim().is_empty() =>
            {
                Ok(format!("{column} AS {alias}"))
            }
            other => Err(DbError::InvalidColumnSpec(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        ColumnSpec::from_json(&json).map_err(de::Error::custom)
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSpec::Name(name) => write!(f, "{name:?}"),
            ColumnSpec::Aliased { column, alias } => {
                write!(f, "{{column: {column:?}, alias: {alias:?}}}")
            }
        }
    }
}

impl From<&str> for ColumnSpec {
    fn from(name: &str) -> Self {
        ColumnSpec::Name(name.to_string())
    }
}

impl From<String> for ColumnSpec {
    fn from(name: String) -> Self {
        ColumnSpec::Name(name)
    }
}

impl<C: Into<String>, A: Into<String>> From<(C, A)> for ColumnSpec {
    fn from((column, alias): (C, A)) -> Self {
        ColumnSpec::aliased(column, alias)
    }
}
