//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

use crate::errors::{from_rusqlite, store_unavailable, Result};

/// How long a writer waits on a lock held by an overlapping run
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open an existing SQLite database; a missing file is an error
pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(store_unavailable(&shown, "file does not exist (run init first)"));
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| store_unavailable(&shown, e))?;
    configure(&conn).map_err(|e| store_unavailable(&shown, e))?;
    Ok(conn)
}

/// Open a SQLite database, creating the file if needed
pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| store_unavailable(&shown, e))?;
    }
    let conn = Connection::open(path).map_err(|e| store_unavailable(&shown, e))?;
    configure(&conn).map_err(|e| store_unavailable(&shown, e))?;
    Ok(conn)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
    configure(&conn)?;
    Ok(conn)
}

/// Configure a connection: WAL journal and a bounded busy wait
pub fn configure(conn: &Connection) -> Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT).map_err(from_rusqlite)?;

    // journal_mode reports the resulting mode as a row
    let mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .map_err(from_rusqlite)?;
    tracing::debug!(journal_mode = %mode, "Configured SQLite connection");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sispoll_core::errors::ExErrorKind;

    #[test]
    fn test_open_existing_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_existing(dir.path().join("absent.sqlite3")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::StoreUnavailable);
        assert!(!dir.path().join("absent.sqlite3").exists());
    }

    #[test]
    fn test_open_or_create_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_or_create(dir.path().join("nested").join("poll.sqlite3")).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
