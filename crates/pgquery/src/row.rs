//! Result row materialization.
//!
//! Rows are turned into [`Record`]s: column names are normalized from
//! `UNDERSCORED_UPPER` form to `camelCase`, and each column is read as one of
//! the portable value kinds chosen from its declared SQL type. Unknown types
//! are read as text rather than failing.

use crate::error::DbResult;
use crate::types::SqlType;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::error::Error;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Type};

/// Name and declared type of a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub sql_type: SqlType,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

/// Describe the columns of a prepared PostgreSQL statement.
pub fn describe_columns(stmt: &tokio_postgres::Statement) -> Vec<ColumnMeta> {
    stmt.columns()
        .iter()
        .map(|c| ColumnMeta::new(c.name(), SqlType::from_pg(c.type_())))
        .collect()
}

/// Portable kind a column is materialized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Float,
    Bool,
    Timestamp,
    Text,
}

impl ValueKind {
    pub fn of(sql_type: &SqlType) -> Self {
        match sql_type {
            t if t.is_float() => ValueKind::Float,
            t if t.is_integer() => ValueKind::Int,
            t if t.is_temporal() => ValueKind::Timestamp,
            SqlType::Boolean => ValueKind::Bool,
            _ => ValueKind::Text,
        }
    }
}

/// Convert `PERSON_ID` to `personId`.
///
/// The first underscore-separated segment is lower-cased; every later segment
/// is lower-cased with its first letter capitalized. Empty segments are dropped.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_').filter(|s| !s.is_empty()) {
        let lower = segment.to_lowercase();
        if out.is_empty() {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() { name.to_string() } else { out }
}

/// One materialized row: normalized field names mapped to values, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(f, _)| f.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v))
    }

    /// Serialize to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(f, v)| (f.clone(), serde_json::to_value(v).unwrap_or_default()))
                .collect(),
        )
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Access to the columns of one raw result row.
pub trait RowReader {
    /// Read column `index` as the kind its declared type maps to.
    /// SQL NULL reads as [`Value::Null`].
    fn read(&self, index: usize, column: &ColumnMeta) -> DbResult<Value>;
}

impl RowReader for Row {
    fn read(&self, index: usize, column: &ColumnMeta) -> DbResult<Value> {
        let value = match column.sql_type {
            SqlType::SmallInt => self.try_get::<_, Option<i16>>(index)?.map(Value::from),
            SqlType::Integer => self.try_get::<_, Option<i32>>(index)?.map(Value::from),
            SqlType::BigInt => self.try_get::<_, Option<i64>>(index)?.map(Value::from),
            SqlType::Real => self.try_get::<_, Option<f32>>(index)?.map(Value::from),
            SqlType::Double => self.try_get::<_, Option<f64>>(index)?.map(Value::from),
            SqlType::Numeric => self.try_get::<_, Option<Decimal>>(index)?.map(numeric_value),
            SqlType::Boolean => self.try_get::<_, Option<bool>>(index)?.map(Value::from),
            SqlType::Date => self.try_get::<_, Option<NaiveDate>>(index)?.map(Value::from),
            SqlType::Time => self
                .try_get::<_, Option<NaiveTime>>(index)?
                .map(|t| Value::Timestamp(NaiveDate::default().and_time(t))),
            SqlType::Timestamp => self.try_get::<_, Option<NaiveDateTime>>(index)?.map(Value::from),
            SqlType::TimestampTz => self.try_get::<_, Option<DateTime<Utc>>>(index)?.map(Value::from),
            _ => self
                .try_get::<_, Option<LossyText>>(index)?
                .map(|t| Value::Text(t.0)),
        };
        Ok(value.unwrap_or(Value::Null))
    }
}

/// In-memory rows hold already-decoded values; they are coerced to the column's kind.
impl RowReader for Vec<Value> {
    fn read(&self, index: usize, column: &ColumnMeta) -> DbResult<Value> {
        let value = self.get(index).cloned().unwrap_or(Value::Null);
        Ok(coerce(value, ValueKind::of(&column.sql_type)))
    }
}

/// Coerce a decoded value to `kind`, falling back to text when it does not fit.
pub fn coerce(value: Value, kind: ValueKind) -> Value {
    match (kind, value) {
        (_, Value::Null) => Value::Null,
        (ValueKind::Int, Value::Int(i)) => Value::Int(i),
        (ValueKind::Int, Value::Float(f)) if f.fract() == 0.0 => Value::Int(f as i64),
        (ValueKind::Int, Value::Bool(b)) => Value::Int(i64::from(b)),
        (ValueKind::Float, Value::Float(f)) => Value::Float(f),
        (ValueKind::Float, Value::Int(i)) => Value::Float(i as f64),
        (ValueKind::Bool, Value::Bool(b)) => Value::Bool(b),
        (ValueKind::Bool, Value::Int(i)) => Value::Bool(i != 0),
        (ValueKind::Timestamp, Value::Timestamp(ts)) => Value::Timestamp(ts),
        (ValueKind::Timestamp, Value::Int(millis)) => DateTime::from_timestamp_millis(millis)
            .map(|dt| Value::Timestamp(dt.naive_utc()))
            .unwrap_or(Value::Text(millis.to_string())),
        (_, Value::Text(s)) => Value::Text(s),
        (_, other) => Value::Text(other.to_string()),
    }
}

/// NUMERIC keeps its exact digits and scale as text.
fn numeric_value(decimal: Decimal) -> Value {
    Value::Text(decimal.to_string())
}

/// Text form of any column type, used for types without a dedicated coercion.
struct LossyText(String);

impl<'a> FromSql<'a> for LossyText {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let text = match *ty {
            Type::UUID => uuid::Uuid::from_sql(ty, raw)?.to_string(),
            Type::JSON | Type::JSONB => serde_json::Value::from_sql(ty, raw)?.to_string(),
            _ => String::from_utf8_lossy(raw).into_owned(),
        };
        Ok(LossyText(text))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Builds records from rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct Materializer {
    fetch_limit: Option<usize>,
}

impl Materializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after `limit` rows. Zero or negative means no limit.
    pub fn fetch_limit(mut self, limit: i64) -> Self {
        self.fetch_limit = usize::try_from(limit).ok().filter(|l| *l > 0);
        self
    }

    pub fn materialize<R: RowReader>(
        &self,
        columns: &[ColumnMeta],
        rows: impl IntoIterator<Item = R>,
    ) -> DbResult<Vec<Record>> {
        self.materialize_with(columns, rows, |_, _| {})
    }

    /// Like [`Materializer::materialize`], calling `on_row` with each record and
    /// its 1-based ordinal as it is produced.
    pub fn materialize_with<R: RowReader>(
        &self,
        columns: &[ColumnMeta],
        rows: impl IntoIterator<Item = R>,
        mut on_row: impl FnMut(&Record, usize),
    ) -> DbResult<Vec<Record>> {
        let names: Vec<String> = columns.iter().map(|c| camel_case(&c.name)).collect();
        let mut records = Vec::new();

        for (i, row) in rows.into_iter().enumerate() {
            let mut fields = Vec::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                fields.push((names[index].clone(), row.read(index, column)?));
            }
            let record = Record { fields };
            on_row(&record, i + 1);
            records.push(record);

            if self.fetch_limit == Some(records.len()) {
                break;
            }
        }
        Ok(records)
    }
}
