//! [`SqliteStore`] -- SQLite-backed storage implementation.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::sqlite::schema;

/// SQLite-backed implementation of the [`Storage`](crate::traits::Storage) trait.
///
/// Wraps a [`rusqlite::Connection`] in a `Mutex` for thread safety. All
/// public methods acquire the lock, execute SQL, and release it.
pub struct SqliteStore {
    pub(crate) conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at the given path.
    ///
    /// Enables WAL mode and foreign keys, then initialises the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(?path, "opening SQLite database");

        let conn = Connection::open(path).map_err(|e| {
            StorageError::Connection(format!("failed to open {}: {e}", path.display()))
        })?;
        Self::from_connection(conn, true)
    }

    /// Opens an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        debug!("opening in-memory SQLite database");
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("failed to open in-memory db: {e}")))?;
        Self::from_connection(conn, false)
    }

    fn from_connection(conn: Connection, wal: bool) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_connection(wal)?;
        store.init_schema()?;
        Ok(store)
    }

    /// Sets connection pragmas (WAL mode, foreign keys, busy timeout).
    fn configure_connection(&self, wal: bool) -> Result<()> {
        let conn = self.lock_conn()?;

        if wal {
            // journal_mode returns a row, so it cannot go through execute_batch.
            conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
                .map_err(|e| StorageError::Connection(format!("failed to enable WAL: {e}")))?;
        }
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| StorageError::Connection(format!("failed to set pragmas: {e}")))?;

        Ok(())
    }

    /// Creates all tables and indexes if they do not exist, then runs
    /// migrations.
    pub(crate) fn init_schema(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        if let Some(v) = Self::schema_version_on_conn(&conn)? {
            if v >= schema::CURRENT_SCHEMA_VERSION {
                debug!(version = v, "schema already at current version, skipping init");
                return Self::run_migrations_on_conn(&conn);
            }
        }

        for stmt in schema::SCHEMA_STATEMENTS {
            conn.execute_batch(stmt).map_err(|e| StorageError::Migration {
                name: "init_schema".into(),
                reason: format!("{e}\nStatement: {}", truncate(stmt.trim(), 120)),
            })?;
        }

        Self::run_migrations_on_conn(&conn)?;

        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
            rusqlite::params![schema::CURRENT_SCHEMA_VERSION.to_string()],
        )
        .map_err(|e| StorageError::Migration {
            name: "schema_version".into(),
            reason: e.to_string(),
        })?;

        info!("schema initialized (version {})", schema::CURRENT_SCHEMA_VERSION);
        Ok(())
    }

    /// The schema version recorded in the database.
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let conn = self.lock_conn()?;
        Self::schema_version_on_conn(&conn)
    }

    /// Reads the recorded schema version. `None` on a fresh database.
    fn schema_version_on_conn(conn: &Connection) -> Result<Option<i32>> {
        let has_metadata: bool = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'metadata'",
            [],
            |row| row.get::<_, i64>(0),
        )? > 0;
        if !has_metadata {
            return Ok(None);
        }

        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM metadata WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.and_then(|v| v.parse().ok()))
    }

    /// Applies pending migrations tracked via the `metadata` table.
    fn run_migrations_on_conn(conn: &Connection) -> Result<()> {
        for &(name, sql) in schema::MIGRATIONS {
            let key = format!("migration:{name}");
            let already_applied: bool = conn.query_row(
                "SELECT COUNT(*) FROM metadata WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, i64>(0),
            )? > 0;

            if already_applied {
                debug!(name, "migration already applied, skipping");
                continue;
            }

            debug!(name, "applying migration");
            conn.execute_batch(sql).map_err(|e| StorageError::Migration {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

            conn.execute(
                "INSERT INTO metadata (key, value) VALUES (?1, ?2)",
                rusqlite::params![key, "applied"],
            )
            .map_err(|e| StorageError::Migration {
                name: name.to_string(),
                reason: format!("failed to mark migration: {e}"),
            })?;
        }
        Ok(())
    }

    /// Acquires the connection lock. Helper used by all operation modules.
    pub(crate) fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Connection(format!("mutex poisoned: {e}")))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

/// Truncates a string for error messages.
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
