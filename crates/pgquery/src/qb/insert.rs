//! INSERT statement builder.

use crate::error::{DbError, DbResult};
use crate::qb::traits::{QueryOptions, Statement};

/// `INSERT INTO <table> (<fields>) VALUES (<placeholders>)`
///
/// Fields and placeholders both come from the data payload, in data order.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    options: QueryOptions,
}

impl Insert {
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_options(QueryOptions::new(table))
    }

    pub fn with_options(options: QueryOptions) -> Self {
        Self { options }
    }
}

impl Statement for Insert {
    const KIND: &'static str = "INSERT";

    fn options(&self) -> &QueryOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut QueryOptions {
        &mut self.options
    }

    fn render(&self) -> DbResult<String> {
        if self.has_conditions() {
            return Err(DbError::ConditionsNotAllowed(Self::KIND));
        }
        let data = &self.options.data;
        if data.is_empty() {
            return Err(DbError::EmptyData(Self::KIND));
        }

        let fields: Vec<&str> = data.fields().collect();
        let placeholders = vec!["?"; fields.len()];
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.options.table,
            fields.join(","),
            placeholders.join(",")
        ))
    }
}
