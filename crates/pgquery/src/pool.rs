//! Connection pool creation

use crate::error::{DbError, DbResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Default maximum number of pooled connections.
pub const DEFAULT_MAX_SIZE: usize = 16;

/// Create a pool for `database_url` with [`DEFAULT_MAX_SIZE`] connections.
///
/// ```ignore
/// let db = pgquery::PgDatabase::new("main", pgquery::create_pool(&url)?);
/// ```
pub fn create_pool(database_url: &str) -> DbResult<Pool> {
    create_pool_with_config(database_url, DEFAULT_MAX_SIZE)
}

/// Create a pool capped at `max_size` connections.
///
/// Connections are checked with a cheap recycle on checkout; the URL is
/// validated here, but nothing connects until the first checkout.
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> DbResult<Pool> {
    if max_size == 0 {
        return Err(DbError::config("pool max_size must be positive"));
    }
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| DbError::Connection(e.to_string()))?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| DbError::Pool(e.to_string()))
}
