//! Statement builders.
//!
//! Each builder describes one SQL statement over a table: a column projection,
//! a data payload and a list of [`Condition`](crate::Condition)s. Building
//! produces SQL with `?` placeholders, and [`Statement::values`] produces the
//! matching parameter list.
//!
//! # Usage
//!
//! ```ignore
//! use pgquery::{qb, Condition, Statement};
//!
//! // INSERT INTO PERSON (id,name) VALUES (?,?)
//! qb::insert("PERSON")
//!     .add_data(pgquery::data! { "id" => 1, "name" => "John" }, None)
//!     .execute(&registry)
//!     .await?;
//!
//! // SELECT * FROM PERSON WHERE id = ?
//! let people = qb::select("PERSON")
//!     .add_condition(Condition::equals("id", 1))
//!     .execute(&registry)
//!     .await?
//!     .into_rows();
//!
//! // UPDATE PERSON SET name = ? WHERE id = ?
//! qb::update("PERSON")
//!     .add_data([("name", "Johnny")], None)
//!     .add_condition(Condition::equals("id", 1))
//!     .execute(&registry)
//!     .await?;
//! ```

mod column;
mod data;
mod delete;
mod insert;
mod select;
mod traits;
mod update;

pub use column::ColumnSpec;
pub use data::DataMap;
pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use traits::{DEFAULT_DATABASE, QueryOptions, Statement};
pub use update::Update;

/// Create an INSERT builder for the given table.
pub fn insert(table: &str) -> Insert {
    Insert::new(table)
}

/// Create a SELECT builder for the given table.
pub fn select(table: &str) -> Select {
    Select::new(table)
}

/// Create an UPDATE builder for the given table.
pub fn update(table: &str) -> Update {
    Update::new(table)
}

/// Create a DELETE builder for the given table.
///
/// A DELETE without filters fails to build unless
/// [`Delete::allow_delete_all`] is set.
pub fn delete(table: &str) -> Delete {
    Delete::new(table)
}
