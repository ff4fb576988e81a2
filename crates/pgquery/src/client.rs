//! Database handle trait and execution outcomes.

use crate::error::DbResult;
use crate::row::Record;
use crate::value::Value;
use async_trait::async_trait;

/// A named database handle statements can run on.
///
/// SQL passed to [`Database::execute`] uses `?` placeholders; each handle
/// translates them to its driver's syntax. Handles are shared through a
/// [`Registry`](crate::Registry) as `Arc<dyn Database>`.
#[async_trait]
pub trait Database: Send + Sync {
    /// Registry name of this handle.
    fn name(&self) -> &str;

    /// Run one statement.
    ///
    /// Row-returning statements yield [`Outcome::Rows`]; everything else yields
    /// the affected row count.
    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<Outcome>;

    /// Release pooled resources. Later calls to `execute` fail.
    fn close(&self) {}
}

/// Result of executing a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rows(Vec<Record>),
    Count(u64),
}

impl Outcome {
    /// Materialized rows, empty for non-query statements.
    pub fn rows(&self) -> &[Record] {
        match self {
            Outcome::Rows(rows) => rows,
            Outcome::Count(_) => &[],
        }
    }

    pub fn into_rows(self) -> Vec<Record> {
        match self {
            Outcome::Rows(rows) => rows,
            Outcome::Count(_) => Vec::new(),
        }
    }

    /// Affected rows, or the number of rows returned by a query.
    pub fn count(&self) -> u64 {
        match self {
            Outcome::Rows(rows) => rows.len() as u64,
            Outcome::Count(n) => *n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_accessors() {
        let record: Record = [("id", 1)].into_iter().collect();
        let rows = Outcome::Rows(vec![record.clone(), record]);
        assert_eq!(rows.count(), 2);
        assert_eq!(rows.rows().len(), 2);
        assert_eq!(rows.into_rows().len(), 2);

        let count = Outcome::Count(5);
        assert_eq!(count.count(), 5);
        assert!(count.rows().is_empty());
        assert!(count.into_rows().is_empty());
    }
}
