use rusqlite::{Connection, Result};
use std::sync::{Mutex, MutexGuard};

use crate::db::migration_runner;
use crate::error::JournalError;

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Self::migrate(conn, db_path)
    }

    /// Private database for tests and throwaway sessions
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Self::migrate(conn, ":memory:")
    }

    fn migrate(conn: Connection, db_path: &str) -> Result<Self> {
        let applied = migration_runner::migrate(&conn, db_path)?;
        migration_runner::verify_checksums(&conn)?;

        if applied > 0 {
            log::info!(
                "Applied {} migrations, schema now at version {}",
                applied,
                migration_runner::latest_version()
            );
        } else {
            log::info!("Database schema is up to date");
        }

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn lock(&self) -> std::result::Result<MutexGuard<'_, Connection>, JournalError> {
        self.conn
            .lock()
            .map_err(|e| JournalError::Storage(format!("database lock poisoned: {}", e)))
    }
}
