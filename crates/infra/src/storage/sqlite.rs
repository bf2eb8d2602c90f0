//! SQLite-backed local store on an r2d2 connection pool.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use timesheet_core::LocalStore;
use timesheet_domain::{Result, TimesheetError};
use tracing::{debug, info};

use crate::errors::InfraError;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

type Connection = PooledConnection<SqliteConnectionManager>;

/// Durable [`LocalStore`]: one `kv_store` row per key.
pub struct SqliteLocalStore {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl SqliteLocalStore {
    /// Open (creating if needed) the database at `db_path` and apply the
    /// schema.
    pub fn open<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| TimesheetError::from(InfraError::from(err)))?;
        }

        let manager = SqliteConnectionManager::file(&path).with_init(|conn| {
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
        });
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(|err| TimesheetError::from(InfraError::from(err)))?;

        let store = Self { pool, path };
        store.run_migrations()?;

        info!(
            db_path = %store.path.display(),
            max_connections = pool_size.max(1),
            "local store opened"
        );
        Ok(store)
    }

    /// Ensure the schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            params![SCHEMA_VERSION, unix_seconds()],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify the database answers a trivial query.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0)).map_err(map_sql_error)?;
        Ok(())
    }

    fn connection(&self) -> Result<Connection> {
        self.pool.get().map_err(|err| TimesheetError::from(InfraError::from(err)))
    }
}

impl LocalStore for SqliteLocalStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.connection()?;
        conn.query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| {
            row.get::<_, Vec<u8>>(0)
        })
        .optional()
        .map_err(map_sql_error)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
              ON CONFLICT(key) DO UPDATE
              SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, unix_seconds()],
        )
        .map_err(map_sql_error)?;
        debug!(key, bytes = value.len(), "local store write");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key]).map_err(map_sql_error)?;
        Ok(())
    }
}

fn unix_seconds() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or_default()
}

fn map_sql_error(err: rusqlite::Error) -> TimesheetError {
    TimesheetError::from(InfraError::from(err))
}
