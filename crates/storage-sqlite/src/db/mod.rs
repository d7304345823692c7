//! Database setup: file initialization, the read pool and the writer actor.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use diesel::connection::{Connection, SimpleConnection};
use diesel::r2d2::{self, ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use log::info;

use crate::errors::{IntoCore, StorageError};
use secmaster_core::constants::TABLE_REGISTRY;
use secmaster_core::errors::Result;

pub mod write_actor;
pub use write_actor::{spawn_writer, WriteHandle};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

const CONNECTION_PRAGMAS: &str = "
    PRAGMA busy_timeout = 30000;
    PRAGMA synchronous = NORMAL;
";

/// Prepare the database file at `db_path`: create the parent directory,
/// switch to WAL and create the table bookkeeping table.
pub fn init(db_path: &str) -> Result<String> {
    if let Some(db_dir) = Path::new(db_path).parent() {
        if !db_dir.as_os_str().is_empty() && !db_dir.exists() {
            fs::create_dir_all(db_dir).map_err(StorageError::from)?;
        }
    }

    let mut conn = SqliteConnection::establish(db_path).into_core()?;
    conn.batch_execute(&format!(
        "PRAGMA journal_mode = WAL;
         {}
         CREATE TABLE IF NOT EXISTS {} (
             name TEXT NOT NULL PRIMARY KEY,
             created_at TEXT NOT NULL
         );",
        CONNECTION_PRAGMAS, TABLE_REGISTRY
    ))
    .into_core()?;

    info!("Database initialized at {}", db_path);
    Ok(db_path.to_string())
}

pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = r2d2::Pool::builder()
        .max_size(8)
        .min_idle(Some(1))
        .connection_timeout(Duration::from_secs(30))
        .connection_customizer(Box::new(ConnectionCustomizer))
        .build(manager)
        .into_core()?;
    Ok(Arc::new(pool))
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection> {
    pool.get().into_core()
}

#[derive(Debug)]
struct ConnectionCustomizer;

impl r2d2::CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
        conn.batch_execute(CONNECTION_PRAGMAS)
            .map_err(r2d2::Error::QueryError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("secmaster.db");
        let db_path = db_path.to_str().unwrap();

        assert_eq!(init(db_path).unwrap(), db_path);
        assert!(Path::new(db_path).exists());

        // Idempotent
        init(db_path).unwrap();
    }

    #[test]
    fn test_pool_hands_out_connections() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("secmaster.db");
        let db_path = init(db_path.to_str().unwrap()).unwrap();

        let pool = create_pool(&db_path).unwrap();
        let mut conn = get_connection(&pool).unwrap();
        conn.batch_execute("SELECT 1;").unwrap();
    }
}
