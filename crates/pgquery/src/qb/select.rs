//! SELECT statement builder.

use crate::error::DbResult;
use crate::qb::traits::{QueryOptions, Statement, where_clause};

/// `SELECT <columns> FROM <table> [WHERE ...]`
///
/// Data entries act as `field = ?` filters and come before the conditions in
/// the WHERE clause, matching the parameter order.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    options: QueryOptions,
}

impl Select {
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_options(QueryOptions::new(table))
    }

    pub fn with_options(options: QueryOptions) -> Self {
        Self { options }
    }

    fn render_columns(&self) -> DbResult<String> {
        if self.options.columns.is_empty() {
            return Ok("*".to_string());
        }
        let columns = self
            .options
            .columns
            .iter()
            .map(|c| c.render())
            .collect::<DbResult<Vec<_>>>()?;
        Ok(columns.join(","))
    }
}

impl Statement for Select {
    const KIND: &'static str = "SELECT";

    fn options(&self) -> &QueryOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut QueryOptions {
        &mut self.options
    }

    fn render(&self) -> DbResult<String> {
        let mut sql = format!("SELECT {} FROM {}", self.render_columns()?, self.options.table);
        if let Some(clause) = where_clause(Some(&self.options.data), &self.options.conditions)? {
            sql.push_str(&clause);
        }
        Ok(sql)
    }
}
