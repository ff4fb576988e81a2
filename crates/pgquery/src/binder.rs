//! Positional parameter binding.
//!
//! The binder pairs each value from [`Statement::values`](crate::Statement::values)
//! with the type the database declared for that placeholder and coerces it to
//! the matching wire representation. Character and unrecognized types always
//! fall back to the value's text form.

use crate::error::{DbError, DbResult};
use crate::types::SqlType;
use crate::value::{TIMESTAMP_FORMAT, Value};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A value coerced to the declared type of its placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundParam {
    /// Typed SQL NULL.
    Null(SqlType),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Numeric(Decimal),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Text(String),
}

impl ToSql for BoundParam {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            BoundParam::Null(_) => Ok(IsNull::Yes),
            BoundParam::SmallInt(v) => v.to_sql(ty, out),
            BoundParam::Integer(v) => v.to_sql(ty, out),
            BoundParam::BigInt(v) => v.to_sql(ty, out),
            BoundParam::Real(v) => v.to_sql(ty, out),
            BoundParam::Double(v) => v.to_sql(ty, out),
            BoundParam::Numeric(v) => v.to_sql(ty, out),
            BoundParam::Bool(v) => v.to_sql(ty, out),
            BoundParam::Date(v) => v.to_sql(ty, out),
            BoundParam::Time(v) => v.to_sql(ty, out),
            BoundParam::Timestamp(v) => v.to_sql(ty, out),
            BoundParam::TimestampTz(v) => v.to_sql(ty, out),
            BoundParam::Text(v) => match *ty {
                Type::UUID => uuid::Uuid::parse_str(v.trim())?.to_sql(ty, out),
                Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(v)?.to_sql(ty, out),
                _ => v.as_str().to_sql(ty, out),
            },
        }
    }

    // The binder already chose a representation from the declared type.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Bind `values` to placeholders declared as `types`, position by position.
///
/// Fails with [`DbError::ParameterCountMismatch`] before any coercion when the
/// counts differ.
pub fn bind(types: &[SqlType], values: &[Value]) -> DbResult<Vec<BoundParam>> {
    if types.len() != values.len() {
        return Err(DbError::ParameterCountMismatch {
            expected: types.len(),
            actual: values.len(),
        });
    }

    types
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (ty, value))| {
            let position = i + 1;
            tracing::debug!(
                target: "pgquery.bind",
                position,
                sql_type = %ty,
                value_type = value.type_name(),
                value = %value,
                "binding parameter"
            );
            bind_one(position, ty, value)
        })
        .collect()
}

/// Coerce a single value to `ty`. `position` is 1-based and only used in errors.
pub fn bind_one(position: usize, ty: &SqlType, value: &Value) -> DbResult<BoundParam> {
    if value.is_null() {
        return Ok(BoundParam::Null(ty.clone()));
    }

    Ok(match ty {
        SqlType::SmallInt => {
            let v = to_i64(position, value)?;
            BoundParam::SmallInt(narrow(position, v, "smallint")?)
        }
        SqlType::Integer => {
            let v = to_i64(position, value)?;
            BoundParam::Integer(narrow(position, v, "integer")?)
        }
        SqlType::BigInt => BoundParam::BigInt(to_i64(position, value)?),
        SqlType::Real => BoundParam::Real(to_f64(position, value)? as f32),
        SqlType::Double => BoundParam::Double(to_f64(position, value)?),
        SqlType::Numeric => BoundParam::Numeric(to_decimal(position, value)?),
        SqlType::Boolean => BoundParam::Bool(to_bool(position, value)?),
        SqlType::Date => BoundParam::Date(to_timestamp(position, value)?.date()),
        SqlType::Time => BoundParam::Time(to_timestamp(position, value)?.time()),
        SqlType::Timestamp => BoundParam::Timestamp(to_timestamp(position, value)?),
        SqlType::TimestampTz => BoundParam::TimestampTz(to_timestamp(position, value)?.and_utc()),
        SqlType::Char | SqlType::VarChar | SqlType::Text | SqlType::Other(_) => {
            BoundParam::Text(value.to_string())
        }
    })
}

fn narrow<T: TryFrom<i64>>(position: usize, v: i64, target: &str) -> DbResult<T> {
    T::try_from(v).map_err(|_| DbError::coercion(position, format!("{v} is out of range for {target}")))
}

fn to_i64(position: usize, value: &Value) -> DbResult<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(*f as i64),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| DbError::coercion(position, format!("'{s}' is not an integer"))),
        Value::Timestamp(ts) => Ok(ts.and_utc().timestamp_millis()),
        other => Err(DbError::coercion(position, format!("{other} is not an integer"))),
    }
}

fn to_f64(position: usize, value: &Value) -> DbResult<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| DbError::coercion(position, format!("'{s}' is not a number"))),
        other => Err(DbError::coercion(position, format!("{other} is not a number"))),
    }
}

fn to_decimal(position: usize, value: &Value) -> DbResult<Decimal> {
    match value {
        Value::Int(i) => Ok(Decimal::from(*i)),
        Value::Float(f) => Decimal::try_from(*f)
            .map_err(|_| DbError::coercion(position, format!("{f} is not a finite decimal"))),
        Value::Bool(b) => Ok(Decimal::from(i64::from(*b))),
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(s))
                .map_err(|_| DbError::coercion(position, format!("'{s}' is not a decimal")))
        }
        other => Err(DbError::coercion(position, format!("{other} is not a decimal"))),
    }
}

fn to_bool(position: usize, value: &Value) -> DbResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Ok(false),
            _ => Err(DbError::coercion(position, format!("'{s}' is not a boolean"))),
        },
        other => Err(DbError::coercion(position, format!("{other} is not a boolean"))),
    }
}

/// Integers are epoch milliseconds; text accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]`
/// (with a space or `T`) and plain dates.
fn to_timestamp(position: usize, value: &Value) -> DbResult<NaiveDateTime> {
    let invalid = || DbError::coercion(position, format!("{value} is not a timestamp"));
    match value {
        Value::Timestamp(ts) => Ok(*ts),
        Value::Int(millis) => DateTime::from_timestamp_millis(*millis)
            .map(|dt| dt.naive_utc())
            .ok_or_else(invalid),
        Value::Text(s) => parse_timestamp(s.trim()).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
