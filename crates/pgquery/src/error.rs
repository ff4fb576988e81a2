//! Error types for pgquery

use thiserror::Error;

/// Result type alias for pgquery operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for statement building, binding and execution
#[derive(Debug, Error)]
pub enum DbError {
    /// Statement has no table
    #[error("Query needs a table name")]
    TableNotSet,

    /// INSERT/UPDATE without any data
    #[error("No data set for the {0} statement")]
    EmptyData(&'static str),

    /// Column projection that cannot be rendered
    #[error("Invalid column spec: {0}")]
    InvalidColumnSpec(String),

    /// Condition without a field
    #[error("Field not set")]
    MissingField,

    /// Condition without a value
    #[error("Value not set on condition for '{0}'")]
    MissingValue(String),

    /// Condition without an operator
    #[error("Operator not set on condition for '{0}'")]
    MissingOperator(String),

    /// BETWEEN condition without its upper bound
    #[error("Second value not set on BETWEEN condition for '{0}'")]
    MissingSecondValue(String),

    /// OR group with no children
    #[error("OR condition has no children")]
    EmptyOr,

    /// INSERT carrying WHERE conditions
    #[error("{0} statements do not take conditions")]
    ConditionsNotAllowed(&'static str),

    /// DELETE that would hit every row
    #[error("DELETE FROM {0} has no conditions; call allow_delete_all(true) to permit it")]
    UnconditionedDelete(String),

    /// Placeholder count does not match the value count
    #[error("Statement expects {expected} parameters, got {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },

    /// Value cannot be coerced to the declared parameter type
    #[error("Cannot bind parameter {position}: {message}")]
    Coercion { position: usize, message: String },

    /// Driver error (syntax, constraint, connectivity)
    #[error("Database error: {0}")]
    Database(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// No handle registered under the given name
    #[error("Unknown database: {0}")]
    UnknownDatabase(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Create a database error carrying the driver message
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a coercion error for a 1-based parameter position
    pub fn coercion(position: usize, message: impl Into<String>) -> Self {
        Self::Coercion {
            position,
            message: message.into(),
        }
    }

    /// Whether this error was raised while building a statement, before it
    /// could reach the database.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::TableNotSet
                | Self::EmptyData(_)
                | Self::InvalidColumnSpec(_)
                | Self::MissingField
                | Self::MissingValue(_)
                | Self::MissingOperator(_)
                | Self::MissingSecondValue(_)
                | Self::EmptyOr
                | Self::ConditionsNotAllowed(_)
                | Self::UnconditionedDelete(_)
        )
    }

    /// Whether this error came from parameter binding
    pub fn is_binding(&self) -> bool {
        matches!(self, Self::ParameterCountMismatch { .. } | Self::Coercion { .. })
    }
}

impl From<tokio_postgres::Error> for DbError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.as_db_error() {
            Some(db_err) => Self::Database(format!("{}: {}", db_err.code().code(), db_err.message())),
            None if err.is_closed() => Self::Connection(err.to_string()),
            None => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
