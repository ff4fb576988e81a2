//! SQL tracing.

/// Emits executed SQL as `tracing` events under the `pgquery.sql` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlLog {
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlLog {
    fn default() -> Self {
        Self {
            max_sql_length: Some(200),
        }
    }
}

impl SqlLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    pub fn emit(&self, database: &str, sql: &str, param_count: usize) {
        if !tracing::enabled!(target: "pgquery.sql", tracing::Level::DEBUG) {
            return;
        }
        let sql = self.truncate_sql(sql);
        tracing::debug!(
            target: "pgquery.sql",
            database,
            param_count,
            sql = %sql,
        );
    }
}

/// Longest prefix of `s` within `max_bytes` that ends on a char boundary.
fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
