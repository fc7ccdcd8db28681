//! Database connection management.
//!
//! [`Store`] is created once per process and guarantees that migrations have
//! run before any other operation.  Every service operation then calls
//! [`Store::connect`] and works on its own [`Database`]; dropping the
//! `Database` closes the connection, whichever way the operation exits.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;
use crate::migrations;

/// Default time a connection waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Process-wide storage handle.  Cheap to clone; holds no connection.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Store {
    /// Open (or create) the database file at `path` and migrate it.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!(path = %path.display(), "opening database");

        let db = Database::open_at(path, busy_timeout)?;

        // WAL is persistent in the file, so setting it once is enough.
        db.conn().pragma_update(None, "journal_mode", "WAL")?;

        migrations::run_migrations(db.conn())?;

        Ok(Self {
            path: path.to_path_buf(),
            busy_timeout,
        })
    }

    /// Open a fresh connection for a single operation.
    pub fn connect(&self) -> Result<Database> {
        Database::open_at(&self.path, self.busy_timeout)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a connection to an existing (or new) database file.
    ///
    /// No migrations are run here; go through [`Store::open`] for that.
    pub fn open_at(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;

        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed CRUD helpers, but direct access is
    /// occasionally needed for ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path()).finish()
    }
}
