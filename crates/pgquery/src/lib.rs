//! # pgquery
//!
//! A small condition-based SQL statement builder with a PostgreSQL executor.
//!
//! ## Features
//!
//! - **Statement builders**: INSERT, SELECT, UPDATE and DELETE over a table, a
//!   data payload and composable conditions, rendered with `?` placeholders
//! - **Positional parameters**: `values()` always lines up with the placeholders
//!   in the rendered SQL
//! - **Type-driven binding**: each value is coerced to the type the database
//!   declares for its placeholder
//! - **Portable rows**: results come back as [`Record`]s with camelCase field names
//! - **Named databases**: statements target a handle in a [`Registry`], `main` by default
//!
//! ## Usage
//!
//! ```ignore
//! use pgquery::{qb, Condition, Registry, RegistryConfig, Statement};
//!
//! let registry = Registry::from_config(&RegistryConfig::from_env()?)?;
//!
//! // SELECT * FROM PERSON WHERE age > ? AND (name = ? OR name = ?)
//! let people = qb::select("PERSON")
//!     .add_condition(Condition::greater("age", 18))
//!     .add_condition(Condition::or(vec![
//!         Condition::equals("name", "John"),
//!         Condition::equals("name", "Mary"),
//!     ]))
//!     .execute(&registry)
//!     .await?
//!     .into_rows();
//!
//! for person in &people {
//!     println!("{:?}", person.get("personId"));
//! }
//! ```

pub mod binder;
pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod log;
pub mod pool;
pub mod postgres;
pub mod qb;
pub mod registry;
pub mod row;
pub mod types;
pub mod value;

pub use binder::{BoundParam, bind};
pub use client::{Database, Outcome};
pub use condition::{Comparison, Condition, Op};
pub use config::{DatabaseConfig, RegistryConfig};
pub use error::{DbError, DbResult};
pub use log::SqlLog;
pub use pool::{create_pool, create_pool_with_config};
pub use postgres::{PgDatabase, rewrite_placeholders};
pub use registry::Registry;
pub use row::{ColumnMeta, Materializer, Record, RowReader, camel_case};
pub use types::SqlType;
pub use value::Value;

pub use qb::{
    ColumnSpec, DEFAULT_DATABASE, DataMap, Delete, Insert, QueryOptions, Select, Statement, Update,
    delete, insert, select, update,
};
