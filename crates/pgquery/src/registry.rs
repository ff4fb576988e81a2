//! Named database handles.

use crate::client::{Database, Outcome};
use crate::config::RegistryConfig;
use crate::error::{DbError, DbResult};
use crate::postgres::PgDatabase;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Database handles keyed by name.
///
/// Statements resolve their target through [`Registry::get`] using
/// [`QueryOptions::database`](crate::QueryOptions::database), `main` by default.
#[derive(Clone, Default)]
pub struct Registry {
    databases: HashMap<String, Arc<dyn Database>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a PostgreSQL pool for every configured database.
    pub fn from_config(config: &RegistryConfig) -> DbResult<Self> {
        let mut registry = Self::new();
        for (name, db_config) in &config.databases {
            registry.register(name.clone(), Arc::new(PgDatabase::connect(name.clone(), db_config)?));
        }
        Ok(registry)
    }

    /// Register `db` under `name`, returning any handle it replaces.
    pub fn register(&mut self, name: impl Into<String>, db: Arc<dyn Database>) -> Option<Arc<dyn Database>> {
        self.databases.insert(name.into(), db)
    }

    pub fn get(&self, name: &str) -> DbResult<Arc<dyn Database>> {
        self.databases
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::UnknownDatabase(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }

    /// Unregister and close the handle under `name`.
    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Database>> {
        let db = self.databases.remove(name)?;
        db.close();
        Some(db)
    }

    /// Close every handle and empty the registry.
    pub fn close(&mut self) {
        for (name, db) in self.databases.drain() {
            tracing::debug!(target: "pgquery", database = %name, "closing database");
            db.close();
        }
    }

    /// Run raw SQL with `?` placeholders on the database registered under `name`.
    pub async fn execute(&self, name: &str, sql: &str, params: &[Value]) -> DbResult<Outcome> {
        self.get(name)?.execute(sql, params).await
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("databases", &names).finish()
    }
}
