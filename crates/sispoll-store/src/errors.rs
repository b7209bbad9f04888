//! Error handling for sispoll-store
//!
//! Wraps sispoll-core ExError with store-specific helpers

use postgres::error::SqlState;
use rusqlite::ErrorCode;
use sispoll_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::StoreUnavailable)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::StoreUnavailable)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// The database file could not be opened or prepared
pub fn store_unavailable(path: &str, reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::StoreUnavailable)
        .with_op("open_store")
        .with_message(format!("Cannot use baseline store {}: {}", path, reason))
}

/// Create a database error from rusqlite::Error
///
/// Unique and primary key violations become `AlreadyExists`; a busy or locked
/// database that outlived the busy timeout becomes `Timeout`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::ConstraintViolation
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                ExErrorKind::AlreadyExists
            }
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => ExErrorKind::Timeout,
            ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::ReadOnly => {
                ExErrorKind::StoreUnavailable
            }
            _ => ExErrorKind::Persistence,
        },
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Classify a Postgres SQLSTATE the same way [`from_rusqlite`] classifies
/// SQLite result codes
pub fn kind_for_sqlstate(code: Option<&SqlState>) -> ExErrorKind {
    let Some(code) = code else {
        return ExErrorKind::Persistence;
    };
    if *code == SqlState::UNIQUE_VIOLATION {
        ExErrorKind::AlreadyExists
    } else if *code == SqlState::LOCK_NOT_AVAILABLE || *code == SqlState::QUERY_CANCELED {
        ExErrorKind::Timeout
    } else if *code == SqlState::UNDEFINED_TABLE
        || *code == SqlState::INVALID_SCHEMA_NAME
        || *code == SqlState::INVALID_PASSWORD
        || *code == SqlState::INVALID_AUTHORIZATION_SPECIFICATION
        || *code == SqlState::INVALID_CATALOG_NAME
    {
        ExErrorKind::StoreUnavailable
    } else {
        ExErrorKind::Persistence
    }
}

/// Create a database error from postgres::Error
///
/// A dropped connection becomes `StoreUnavailable`.
pub fn from_postgres(err: postgres::Error) -> ExError {
    let kind = if err.code().is_none() && err.is_closed() {
        ExErrorKind::StoreUnavailable
    } else {
        kind_for_sqlstate(err.code())
    };
    ExError::new(kind)
        .with_op("postgres")
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_unique_violation_is_already_exists() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT PRIMARY KEY NOT NULL); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .map_err(from_rusqlite)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
    }

    #[test]
    fn test_sqlstate_classification() {
        assert_eq!(
            kind_for_sqlstate(Some(&SqlState::UNIQUE_VIOLATION)),
            ExErrorKind::AlreadyExists
        );
        assert_eq!(
            kind_for_sqlstate(Some(&SqlState::LOCK_NOT_AVAILABLE)),
            ExErrorKind::Timeout
        );
        assert_eq!(
            kind_for_sqlstate(Some(&SqlState::UNDEFINED_TABLE)),
            ExErrorKind::StoreUnavailable
        );
        assert_eq!(
            kind_for_sqlstate(Some(&SqlState::NOT_NULL_VIOLATION)),
            ExErrorKind::Persistence
        );
        assert_eq!(kind_for_sqlstate(None), ExErrorKind::Persistence);
    }

    #[test]
    fn test_other_failures_are_persistence() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn
            .execute("INSERT INTO missing_table VALUES (1)", [])
            .map_err(from_rusqlite)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
    }
}
