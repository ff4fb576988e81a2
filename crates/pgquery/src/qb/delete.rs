//! DELETE statement builder.

use crate::error::{DbError, DbResult};
use crate::qb::traits::{QueryOptions, Statement, where_clause};

/// `DELETE FROM <table> WHERE ...`
///
/// Data entries act as `field = ?` filters, like in [`Select`](crate::Select).
/// A DELETE with nothing to filter on is rejected unless
/// [`Delete::allow_delete_all`] is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    options: QueryOptions,
    allow_delete_all: bool,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_options(QueryOptions::new(table))
    }

    pub fn with_options(options: QueryOptions) -> Self {
        Self {
            options,
            allow_delete_all: false,
        }
    }

    /// Permit a DELETE without any filter (removes every row).
    pub fn allow_delete_all(mut self, allow: bool) -> Self {
        self.allow_delete_all = allow;
        self
    }
}

impl Statement for Delete {
    const KIND: &'static str = "DELETE";

    fn options(&self) -> &QueryOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut QueryOptions {
        &mut self.options
    }

    fn render(&self) -> DbResult<String> {
        let mut sql = format!("DELETE FROM {}", self.options.table);
        match where_clause(Some(&self.options.data), &self.options.conditions)? {
            Some(clause) => sql.push_str(&clause),
            None if self.allow_delete_all => {}
            None => return Err(DbError::UnconditionedDelete(self.options.table.clone())),
        }
        Ok(sql)
    }
}
