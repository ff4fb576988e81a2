//! Portable SQL type tags.
//!
//! Both the parameter binder and the row materializer pick their coercion
//! from these tags rather than from driver types directly.

use std::fmt;
use tokio_postgres::types::Type;

/// Declared SQL type of a parameter or result column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlType {
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    /// Arbitrary precision NUMERIC/DECIMAL.
    Numeric,
    Boolean,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Char,
    VarChar,
    Text,
    /// Any type without a dedicated coercion, by its database name.
    Other(String),
}

impl SqlType {
    /// Map a PostgreSQL type.
    pub fn from_pg(ty: &Type) -> Self {
        match *ty {
            Type::INT2 => SqlType::SmallInt,
            Type::INT4 => SqlType::Integer,
            Type::INT8 => SqlType::BigInt,
            Type::FLOAT4 => SqlType::Real,
            Type::FLOAT8 => SqlType::Double,
            Type::NUMERIC => SqlType::Numeric,
            Type::BOOL => SqlType::Boolean,
            Type::DATE => SqlType::Date,
            Type::TIME => SqlType::Time,
            Type::TIMESTAMP => SqlType::Timestamp,
            Type::TIMESTAMPTZ => SqlType::TimestampTz,
            Type::BPCHAR | Type::CHAR => SqlType::Char,
            Type::VARCHAR => SqlType::VarChar,
            Type::TEXT | Type::NAME | Type::UNKNOWN => SqlType::Text,
            _ => SqlType::Other(ty.name().to_string()),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, SqlType::SmallInt | SqlType::Integer | SqlType::BigInt)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SqlType::Real | SqlType::Double)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            SqlType::Date | SqlType::Time | SqlType::Timestamp | SqlType::TimestampTz
        )
    }

    pub fn name(&self) -> &str {
        match self {
            SqlType::SmallInt => "smallint",
            SqlType::Integer => "integer",
            SqlType::BigInt => "bigint",
            SqlType::Real => "real",
            SqlType::Double => "double precision",
            SqlType::Numeric => "numeric",
            SqlType::Boolean => "boolean",
            SqlType::Date => "date",
            SqlType::Time => "time",
            SqlType::Timestamp => "timestamp",
            SqlType::TimestampTz => "timestamptz",
            SqlType::Char => "char",
            SqlType::VarChar => "varchar",
            SqlType::Text => "text",
            SqlType::Other(name) => name,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&Type> for SqlType {
    fn from(ty: &Type) -> Self {
        SqlType::from_pg(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_postgres_types() {
        assert_eq!(SqlType::from_pg(&Type::INT8), SqlType::BigInt);
        assert_eq!(SqlType::from_pg(&Type::FLOAT4), SqlType::Real);
        assert_eq!(SqlType::from_pg(&Type::TIMESTAMPTZ), SqlType::TimestampTz);
        assert_eq!(SqlType::from_pg(&Type::VARCHAR), SqlType::VarChar);
        assert_eq!(SqlType::from_pg(&Type::NUMERIC), SqlType::Numeric);
        assert_eq!(SqlType::from_pg(&Type::UUID), SqlType::Other("uuid".into()));
    }

    #[test]
    fn families() {
        assert!(SqlType::SmallInt.is_integer());
        assert!(SqlType::Double.is_float());
        assert!(SqlType::Time.is_temporal());
        assert!(!SqlType::Numeric.is_integer());
        assert!(!SqlType::Numeric.is_float());
    }
}
