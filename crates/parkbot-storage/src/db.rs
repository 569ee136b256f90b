//! SQLite handle shared by every repository.
//!
//! One `parkbot` process owns one connection. A chat session and a
//! `parkbot history` run may open the same file at once, so file databases
//! use WAL journaling and wait on a busy lock instead of failing.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use parkbot_core::error::ParkbotError;

use crate::migrations;

/// How long a writer waits for another process's lock, in milliseconds.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// The park database: conversation states, chat history and the catalog.
///
/// Repositories share it through an `Arc` and take the connection for the
/// length of one statement or query via [`Database::with_conn`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database file at `path`, creating it and its directory on
    /// first run, and bring the schema up to date.
    pub fn new(path: &Path) -> Result<Self, ParkbotError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| {
            ParkbotError::Storage(format!("Failed to open {}: {}", path.display(), e))
        })?;
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = {};
             PRAGMA foreign_keys = ON;",
            BUSY_TIMEOUT_MS
        ))
        .map_err(|e| ParkbotError::Storage(format!("Failed to configure database: {}", e)))?;

        info!(path = %path.display(), "Park database opened");
        Self::migrated(conn)
    }

    /// A private database that disappears with the handle. Used by tests and
    /// `--in-memory` runs over SQLite.
    ///
    /// Memory databases have no journal file and no other process can reach
    /// them, so only foreign keys are switched on.
    pub fn in_memory() -> Result<Self, ParkbotError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ParkbotError::Storage(format!("Failed to open memory database: {}", e)))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| ParkbotError::Storage(format!("Failed to configure database: {}", e)))?;
        Self::migrated(conn)
    }

    fn migrated(conn: Connection) -> Result<Self, ParkbotError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Run `f` with the connection held. Keep it to one unit of work; every
    /// other repository call waits on the same lock.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ParkbotError>
    where
        F: FnOnce(&Connection) -> Result<T, ParkbotError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ParkbotError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}
