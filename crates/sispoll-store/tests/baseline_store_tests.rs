#![allow(clippy::unwrap_used, clippy::expect_used)]

use sispoll_core::baseline::BaselineStore;
use sispoll_core::errors::ExErrorKind;
use sispoll_core::model::{ChangeSet, FetchedRecord, RecordUpdate, SnapshotRecord, Timestamp};
use sispoll_core::{commit, reconcile, render_report, replace_all};
use sispoll_store::SqliteBaselineStore;
use tempfile::TempDir;

fn ts(t: i64) -> Timestamp {
    Timestamp::from_unix_seconds(t)
}

fn setup() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sis_poller.sqlite3");
    (dir, path)
}

#[test]
fn test_open_requires_initialized_file() {
    let (_dir, path) = setup();
    let err = SqliteBaselineStore::open(&path).err().unwrap();
    assert_eq!(err.kind(), ExErrorKind::StoreUnavailable);
}

#[test]
fn test_baseline_survives_reopen() {
    let (_dir, path) = setup();
    {
        let mut store = SqliteBaselineStore::create(&path).unwrap();
        replace_all(
            &mut store,
            &[SnapshotRecord::new("A", ts(100)), SnapshotRecord::new("B", ts(200))],
        )
        .unwrap();
    }

    let store = SqliteBaselineStore::open(&path).unwrap();
    let baseline = store.get_all().unwrap();
    assert_eq!(baseline.len(), 2);
    assert_eq!(baseline.get("A"), Some(ts(100)));
    assert_eq!(baseline.get("B"), Some(ts(200)));
}

#[test]
fn test_poll_cycle_against_sqlite() {
    let (_dir, path) = setup();
    let mut store = SqliteBaselineStore::create(&path).unwrap();
    replace_all(
        &mut store,
        &[SnapshotRecord::new("A", ts(100)), SnapshotRecord::new("B", ts(200))],
    )
    .unwrap();

    let fetched = [
        FetchedRecord::new("A", ts(100)),
        FetchedRecord::new("B", ts(250)),
        FetchedRecord::new("C", ts(50)),
    ];
    let result = reconcile(&fetched, &store.get_all().unwrap());
    let counts = commit(&mut store, &result.change_set).unwrap();

    assert_eq!((counts.added, counts.updated), (1, 1));
    assert_eq!(render_report(&result.change_set), "Adding: C\nUpdated: B\n");

    let again = reconcile(&fetched, &store.get_all().unwrap());
    assert!(again.change_set.is_empty());
}

#[test]
fn test_replace_all_discards_previous_rows() {
    let (_dir, path) = setup();
    let mut store = SqliteBaselineStore::create(&path).unwrap();
    replace_all(&mut store, &[SnapshotRecord::new("OLD", ts(1))]).unwrap();
    replace_all(&mut store, &[SnapshotRecord::new("NEW", ts(2))]).unwrap();

    let baseline = store.get_all().unwrap();
    assert_eq!(baseline.len(), 1);
    assert!(baseline.contains("NEW"));
}

#[test]
fn test_overlapping_runs_keep_maximum() {
    let (_dir, path) = setup();
    let mut first = SqliteBaselineStore::create(&path).unwrap();
    replace_all(&mut first, &[SnapshotRecord::new("A", ts(100))]).unwrap();
    let mut second = SqliteBaselineStore::open(&path).unwrap();

    // Both runs reconcile against the same baseline.
    let mut slow = ChangeSet::new();
    slow.updates.push(RecordUpdate::new("A", ts(100), ts(150)));
    slow.additions.push(SnapshotRecord::new("C", ts(10)));
    let mut fast = ChangeSet::new();
    fast.updates.push(RecordUpdate::new("A", ts(100), ts(200)));
    fast.additions.push(SnapshotRecord::new("C", ts(30)));

    commit(&mut second, &fast).unwrap();
    let counts = commit(&mut first, &slow).unwrap();

    assert_eq!(counts.updated, 0);
    assert_eq!(counts.superseded, 2);
    assert!(counts.failures.is_empty());

    let baseline = first.get_all().unwrap();
    assert_eq!(baseline.get("A"), Some(ts(200)));
    assert_eq!(baseline.get("C"), Some(ts(30)));
}

#[test]
fn test_timestamps_stored_as_unix_seconds() {
    let (_dir, path) = setup();
    let mut store = SqliteBaselineStore::create(&path).unwrap();
    let parsed = Timestamp::parse_listing("2023-05-30 09:29").unwrap();
    replace_all(&mut store, &[SnapshotRecord::new("UU_ALP.xml", parsed)]).unwrap();

    let raw: i64 = store
        .connection()
        .query_row(
            "SELECT last_modified FROM xml_update WHERE xml_file = 'UU_ALP.xml'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(raw, 1_685_438_940);
}
