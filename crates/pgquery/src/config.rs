//! Database configuration.
//!
//! ```toml
//! [databases.main]
//! url = "${DATABASE_URL}"
//! max_size = 8
//!
//! [databases.reporting]
//! url = "postgres://report@localhost/reports"
//! fetch_limit = 1000
//! ```

use crate::error::{DbError, DbResult};
use crate::log::SqlLog;
use crate::pool::DEFAULT_MAX_SIZE;
use crate::qb::DEFAULT_DATABASE;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Settings for one named database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL. `${VAR}` references are expanded from the environment.
    pub url: String,
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// Truncate logged SQL to this many bytes; `0` disables truncation.
    #[serde(default)]
    pub sql_log_max_len: Option<usize>,
    /// Cap on materialized rows per query.
    #[serde(default)]
    pub fetch_limit: Option<i64>,
}

fn default_max_size() -> usize {
    DEFAULT_MAX_SIZE
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_size: DEFAULT_MAX_SIZE,
            sql_log_max_len: None,
            fetch_limit: None,
        }
    }

    pub(crate) fn sql_log(&self) -> SqlLog {
        match self.sql_log_max_len {
            Some(0) => SqlLog::new().no_truncate(),
            Some(len) => SqlLog::new().max_sql_length(len),
            None => SqlLog::new(),
        }
    }

    fn validate(&self, name: &str) -> DbResult<()> {
        if self.url.trim().is_empty() {
            return Err(DbError::config(format!("databases.{name}.url must not be empty")));
        }
        if self.max_size == 0 {
            return Err(DbError::config(format!("databases.{name}.max_size must be positive")));
        }
        Ok(())
    }
}

/// Every database a [`Registry`](crate::Registry) should open, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseConfig>,
}

impl RegistryConfig {
    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DbError::config(format!("failed to read config file {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Parse TOML, expanding `${VAR}` from the process environment.
    pub fn from_toml_str(raw: &str) -> DbResult<Self> {
        Self::from_toml_str_with(raw, |key| std::env::var(key).ok())
    }

    /// Parse TOML, resolving `${VAR}` through `lookup`.
    pub fn from_toml_str_with(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let mut config: RegistryConfig =
            toml::from_str(raw).map_err(|e| DbError::config(format!("failed to parse config: {e}")))?;
        for (name, db) in config.databases.iter_mut() {
            db.url = expand_env_vars(&db.url, &lookup)?;
            db.validate(name)?;
        }
        Ok(config)
    }

    /// Configure `main` from `DATABASE_URL` and optional `DATABASE_MAX_SIZE`.
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let url = lookup("DATABASE_URL").ok_or_else(|| DbError::config("DATABASE_URL is not set"))?;
        let mut db = DatabaseConfig::new(url);
        if let Some(size) = lookup("DATABASE_MAX_SIZE") {
            db.max_size = size
                .trim()
                .parse()
                .map_err(|_| DbError::config(format!("DATABASE_MAX_SIZE is not a number: {size}")))?;
        }
        db.validate(DEFAULT_DATABASE)?;

        let mut databases = BTreeMap::new();
        databases.insert(DEFAULT_DATABASE.to_string(), db);
        Ok(Self { databases })
    }
}

fn expand_env_vars(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> DbResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(DbError::config(format!("unterminated env var reference: ${{{key}}}")));
            }
            if key.is_empty() {
                return Err(DbError::config("invalid env var reference: ${}"));
            }
            let value = lookup(&key)
                .ok_or_else(|| DbError::config(format!("missing env var for config expansion: {key}")))?;
            out.push_str(&value);
            continue;
        }
        out.push(c);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(key: &str) -> Option<String> {
        match key {
            "PG_HOST" => Some("db.internal".into()),
            "DATABASE_URL" => Some("postgres://app@localhost/app".into()),
            "DATABASE_MAX_SIZE" => Some("4".into()),
            _ => None,
        }
    }

    #[test]
    fn parses_named_databases() {
        let config = RegistryConfig::from_toml_str_with(
            r#"
            [databases.main]
            url = "postgres://app@${PG_HOST}/app"

            [databases.reporting]
            url = "postgres://report@localhost/reports"
            max_size = 2
            sql_log_max_len = 0
            fetch_limit = 100
            "#,
            env,
        )
        .unwrap();

        let main = &config.databases["main"];
        assert_eq!(main.url, "postgres://app@db.internal/app");
        assert_eq!(main.max_size, 16);
        assert_eq!(main.sql_log(), SqlLog::default());

        let reporting = &config.databases["reporting"];
        assert_eq!(reporting.max_size, 2);
        assert_eq!(reporting.fetch_limit, Some(100));
        assert_eq!(reporting.sql_log().max_sql_length, None);
    }

    #[test]
    fn missing_env_var_is_a_config_error() {
        let err = RegistryConfig::from_toml_str_with("[databases.main]\nurl = \"${NOPE}\"", env).unwrap_err();
        assert!(matches!(err, DbError::Config(msg) if msg.contains("NOPE")));
    }

    #[test]
    fn rejects_bad_references_and_values() {
        assert!(expand_env_vars("${PG_HOST", &env).is_err());
        assert!(expand_env_vars("${}", &env).is_err());
        assert_eq!(expand_env_vars("$PG_HOST", &env).unwrap(), "$PG_HOST");
        assert!(RegistryConfig::from_toml_str_with("[databases.main]\nurl = \"\"", env).is_err());
        assert!(RegistryConfig::from_toml_str_with("[databases.main]\nurl = \"x\"\nmax_size = 0", env).is_err());
    }

    #[test]
    fn from_lookup_configures_main() {
        let config = RegistryConfig::from_lookup(env).unwrap();
        let main = &config.databases[DEFAULT_DATABASE];
        assert_eq!(main.url, "postgres://app@localhost/app");
        assert_eq!(main.max_size, 4);

        assert!(matches!(
            RegistryConfig::from_lookup(|_| None),
            Err(DbError::Config(_))
        ));
    }
}
