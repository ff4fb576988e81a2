//! Shared statement state and the trait every statement kind implements.

use crate::client::{Database, Outcome};
use crate::condition::Condition;
use crate::error::{DbError, DbResult};
use crate::qb::column::ColumnSpec;
use crate::qb::data::DataMap;
use crate::registry::Registry;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Name of the database a statement runs on unless told otherwise.
pub const DEFAULT_DATABASE: &str = "main";

/// Everything a statement is built from.
///
/// Can be filled in directly and handed to a statement constructor, or built
/// up through the [`Statement`] methods.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Target table. Required.
    pub table: String,
    /// Registry name of the database to execute on.
    pub database: String,
    /// SELECT projection. Empty means `*`.
    pub columns: Vec<ColumnSpec>,
    /// INSERT/UPDATE payload; equality filters for SELECT/DELETE.
    pub data: DataMap,
    /// WHERE conditions, combined with AND.
    pub conditions: Vec<Condition>,
}

impl QueryOptions {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            table: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            columns: Vec::new(),
            data: DataMap::new(),
            conditions: Vec::new(),
        }
    }
}

/// Common interface of INSERT, SELECT, UPDATE and DELETE builders.
///
/// Implementors only supply their grammar in [`Statement::render`]; table
/// checking, parameter ordering and execution are shared.
///
/// Parameters are ordered as data values (in data order) followed by the
/// values of every condition (in condition order). Each `render` must place
/// its `?` placeholders in that same order.
pub trait Statement: Sized + Sync {
    /// SQL keyword of this statement kind.
    const KIND: &'static str;

    fn options(&self) -> &QueryOptions;

    fn options_mut(&mut self) -> &mut QueryOptions;

    /// Render the SQL text. Called by [`Statement::build`] once the table is known to be set.
    fn render(&self) -> DbResult<String>;

    fn table(&self) -> &str {
        &self.options().table
    }

    /// Run on the database registered under `name` instead of `main`.
    fn database(mut self, name: impl Into<String>) -> Self {
        self.options_mut().database = name.into();
        self
    }

    /// Append a column to the projection.
    fn add_column(mut self, column: impl Into<ColumnSpec>) -> Self {
        self.options_mut().columns.push(column.into());
        self
    }

    /// Replace the projection.
    fn set_columns<C: Into<ColumnSpec>>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.options_mut().columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Merge field/value pairs, restricted to `fields` when given.
    fn add_data<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>, fields: Option<&[&str]>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.options_mut().data.merge(entries, fields);
        self
    }

    /// Clear the data, then merge.
    fn set_data<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>, fields: Option<&[&str]>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.options_mut().data.clear();
        self.add_data(entries, fields)
    }

    /// Merge the scalar members of a JSON object.
    fn add_data_json(mut self, json: &serde_json::Value, fields: Option<&[&str]>) -> Self {
        self.options_mut().data.merge_json(json, fields);
        self
    }

    /// Merge the scalar fields of any serializable value.
    fn add_serialized<T: Serialize + ?Sized>(mut self, source: &T, fields: Option<&[&str]>) -> DbResult<Self> {
        self.options_mut().data.merge_serialized(source, fields)?;
        Ok(self)
    }

    fn add_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.options_mut().conditions.push(condition.into());
        self
    }

    fn set_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.options_mut().conditions = conditions;
        self
    }

    fn has_conditions(&self) -> bool {
        !self.options().conditions.is_empty()
    }

    /// Build the SQL text.
    fn build(&self) -> DbResult<String> {
        if self.table().trim().is_empty() {
            return Err(DbError::TableNotSet);
        }
        self.render()
    }

    /// Parameter values in placeholder order.
    fn values(&self) -> DbResult<Vec<Value>> {
        let options = self.options();
        let mut values: Vec<Value> = options.data.values().cloned().collect();
        for condition in &options.conditions {
            values.extend(condition.values()?);
        }
        Ok(values)
    }

    /// Execute on the registered database this statement targets.
    fn execute(&self, registry: &Registry) -> impl std::future::Future<Output = DbResult<Outcome>> + Send {
        async move {
            let sql = self.build()?;
            let values = self.values()?;
            let db = registry.get(&self.options().database)?;
            db.execute(&sql, &values).await
        }
    }

    /// Execute on an explicit database handle.
    fn execute_on(&self, db: &dyn Database) -> impl std::future::Future<Output = DbResult<Outcome>> + Send {
        async move {
            let sql = self.build()?;
            let values = self.values()?;
            db.execute(&sql, &values).await
        }
    }
}

/// Render a WHERE clause from equality filters followed by conditions.
///
/// Returns `None` when there is nothing to filter on.
pub(crate) fn where_clause(filters: Option<&DataMap>, conditions: &[Condition]) -> DbResult<Option<String>> {
    let mut parts: Vec<String> = filters
        .into_iter()
        .flat_map(|data| data.fields())
        .map(|field| format!("{field} = ?"))
        .collect();
    for condition in conditions {
        parts.push(condition.build()?);
    }
    if parts.is_empty() {
        Ok(None)
    } else {
        Ok(Some(format!(" WHERE {}", parts.join(" AND "))))
    }
}
