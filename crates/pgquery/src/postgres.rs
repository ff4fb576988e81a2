//! PostgreSQL database handle.

use crate::binder::bind;
use crate::client::{Database, Outcome};
use crate::config::DatabaseConfig;
use crate::error::DbResult;
use crate::log::SqlLog;
use crate::pool::create_pool_with_config;
use crate::row::{ColumnMeta, Materializer, describe_columns};
use crate::types::SqlType;
use crate::value::Value;
use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::types::ToSql;

/// A [`Database`] backed by a deadpool-postgres connection pool.
///
/// Every call acquires a pooled connection and returns it when the call ends,
/// whether it succeeded or not.
pub struct PgDatabase {
    name: String,
    pool: Pool,
    log: SqlLog,
    materializer: Materializer,
}

impl PgDatabase {
    pub fn new(name: impl Into<String>, pool: Pool) -> Self {
        Self {
            name: name.into(),
            pool,
            log: SqlLog::default(),
            materializer: Materializer::new(),
        }
    }

    /// Create the pool described by `config` and wrap it.
    pub fn connect(name: impl Into<String>, config: &DatabaseConfig) -> DbResult<Self> {
        let name = name.into();
        let pool = create_pool_with_config(&config.url, config.max_size)?;
        tracing::debug!(target: "pgquery", database = %name, max_size = config.max_size, "created pool");

        let mut db = Self::new(name, pool);
        db.log = config.sql_log();
        if let Some(limit) = config.fetch_limit {
            db.materializer = db.materializer.fetch_limit(limit);
        }
        Ok(db)
    }

    pub fn with_sql_log(mut self, log: SqlLog) -> Self {
        self.log = log;
        self
    }

    /// Cap the number of rows materialized per query. Zero or negative means no cap.
    pub fn fetch_limit(mut self, limit: i64) -> Self {
        self.materializer = self.materializer.fetch_limit(limit);
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Declared types of the placeholders in `sql`, in order.
    pub async fn describe_parameters(&self, sql: &str) -> DbResult<Vec<SqlType>> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(&rewrite_placeholders(sql)).await?;
        Ok(stmt.params().iter().map(SqlType::from_pg).collect())
    }

    /// Names and declared types of the columns `sql` returns.
    pub async fn describe_columns(&self, sql: &str) -> DbResult<Vec<ColumnMeta>> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(&rewrite_placeholders(sql)).await?;
        Ok(describe_columns(&stmt))
    }
}

impl std::fmt::Debug for PgDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgDatabase")
            .field("name", &self.name)
            .field("pool", &self.pool.status())
            .finish()
    }
}

#[async_trait]
impl Database for PgDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<Outcome> {
        let sql = rewrite_placeholders(sql);
        self.log.emit(&self.name, &sql, params.len());

        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(&sql).await?;

        let types: Vec<SqlType> = stmt.params().iter().map(SqlType::from_pg).collect();
        let bound = bind(&types, params)?;
        let refs: Vec<&(dyn ToSql + Sync)> = bound.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        if stmt.columns().is_empty() {
            let affected = client.execute(&stmt, &refs).await?;
            return Ok(Outcome::Count(affected));
        }

        let columns = describe_columns(&stmt);
        let rows = client.query(&stmt, &refs).await?;
        let records = self.materializer.materialize(&columns, rows)?;
        Ok(Outcome::Rows(records))
    }

    fn close(&self) {
        tracing::info!(target: "pgquery", database = %self.name, "closing pool");
        self.pool.close();
    }
}

/// Rewrite `?` placeholders to PostgreSQL's `$1, $2, ...`.
///
/// Question marks are left alone inside single-quoted literals, double-quoted
/// identifiers, `--` and `/* */` comments, and dollar-quoted bodies.
pub fn rewrite_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0;
    let mut rest = sql;

    while let Some(c) = rest.chars().next() {
        let skip = match c {
            '?' => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
                rest = &rest[1..];
                continue;
            }
            '\'' | '"' => rest[1..].find(c).map_or(rest.len(), |i| i + 2),
            '-' if rest.starts_with("--") => rest.find('\n').map_or(rest.len(), |i| i + 1),
            '/' if rest.starts_with("/*") => rest[2..].find("*/").map_or(rest.len(), |i| i + 4),
            '$' => dollar_quoted_len(rest).unwrap_or(1),
            _ => c.len_utf8(),
        };
        out.push_str(&rest[..skip]);
        rest = &rest[skip..];
    }
    out
}

/// Length of a `$tag$ ... $tag$` body at the start of `s`, if one starts there.
/// `$1` style parameters are not tags.
fn dollar_quoted_len(s: &str) -> Option<usize> {
    let close = s[1..].find('$')? + 1;
    let tag = &s[1..close];
    let valid = tag.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !tag.starts_with(|c: char| c.is_ascii_digit());
    if !valid {
        return None;
    }
    let delimiter = &s[..=close];
    let body = &s[delimiter.len()..];
    Some(
        body.find(delimiter)
            .map_or(s.len(), |i| delimiter.len() + i + delimiter.len()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_placeholders_in_order() {
        assert_eq!(
            rewrite_placeholders("UPDATE PERSON SET name = ?, age = ? WHERE id = ?"),
            "UPDATE PERSON SET name = $1, age = $2 WHERE id = $3"
        );
        assert_eq!(rewrite_placeholders("SELECT * FROM PERSON"), "SELECT * FROM PERSON");
    }

    #[test]
    fn skips_quoted_text() {
        assert_eq!(
            rewrite_placeholders("SELECT '?', \"a?\" FROM T WHERE x = ? AND y = 'it''s ?'"),
            "SELECT '?', \"a?\" FROM T WHERE x = $1 AND y = 'it''s ?'"
        );
    }

    #[test]
    fn skips_comments() {
        assert_eq!(
            rewrite_placeholders("SELECT a -- why?\nFROM t WHERE a = ? /* b = ? */ AND c = ?"),
            "SELECT a -- why?\nFROM t WHERE a = $1 /* b = ? */ AND c = $2"
        );
        assert_eq!(rewrite_placeholders("SELECT ? -- trailing ?"), "SELECT $1 -- trailing ?");
    }

    #[test]
    fn skips_dollar_quoted_bodies() {
        assert_eq!(
            rewrite_placeholders("SELECT $$a?b$$, $fn$ x ? $fn$, ? FROM t"),
            "SELECT $$a?b$$, $fn$ x ? $fn$, $1 FROM t"
        );
        assert_eq!(
            rewrite_placeholders("SELECT $1::int, ? FROM t"),
            "SELECT $1::int, $1 FROM t"
        );
    }
}
