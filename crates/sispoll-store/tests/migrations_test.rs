// Integration tests for the migration framework

use rusqlite::Connection;
use sispoll_core::errors::ExErrorKind;
use sispoll_store::migrations::{apply_migrations, compute_checksum, get_migrations};

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = setup_test_db();

    let result = apply_migrations(&mut conn);
    assert!(result.is_ok(), "Migrations should succeed: {:?}", result.err());

    let tables = get_table_names(&conn);
    assert_eq!(tables, vec!["schema_version".to_string(), "xml_update".to_string()]);
}

#[test]
fn test_every_migration_recorded_with_checksum() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    for migration in get_migrations() {
        let checksum: String = conn
            .query_row(
                "SELECT checksum FROM schema_version WHERE migration_id = ?",
                [migration.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(checksum, compute_checksum(migration.sql));
    }
}

#[test]
fn test_migrations_idempotent() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count as usize, get_migrations().len());
}

#[test]
fn test_checksum_drift_rejected() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();
    conn.execute(
        "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '001_xml_update'",
        [],
    )
    .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::StoreUnavailable);
    assert!(err.message().contains("001_xml_update"));
}

#[test]
fn test_xml_update_schema_rejects_nulls() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    let result = conn.execute(
        "INSERT INTO xml_update (xml_file, last_modified) VALUES ('UU_ALP.xml', NULL)",
        [],
    );
    assert!(result.is_err());
}
