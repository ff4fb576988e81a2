//! UPDATE statement builder.

use crate::error::{DbError, DbResult};
use crate::qb::traits::{QueryOptions, Statement, where_clause};

/// `UPDATE <table> SET <f1> = ?, <f2> = ? [WHERE ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    options: QueryOptions,
}

impl Update {
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_options(QueryOptions::new(table))
    }

    pub fn with_options(options: QueryOptions) -> Self {
        Self { options }
    }
}

impl Statement for Update {
    const KIND: &'static str = "UPDATE";

    fn options(&self) -> &QueryOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut QueryOptions {
        &mut self.options
    }

    fn render(&self) -> DbResult<String> {
        let data = &self.options.data;
        if data.is_empty() {
            return Err(DbError::EmptyData(Self::KIND));
        }

        let set: Vec<String> = data.fields().map(|f| format!("{f} = ?")).collect();
        let mut sql = format!("UPDATE {} SET {}", self.options.table, set.join(", "));
        // Data is the SET payload here, so only conditions filter.
        if let Some(clause) = where_clause(None, &self.options.conditions)? {
            sql.push_str(&clause);
        }
        Ok(sql)
    }
}
