#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{sources, ts, FakeProvider, RecordingNotifier};
use sispoll_core::baseline::BaselineStore;
use sispoll_engine::{run_init, run_poll};
use sispoll_store::SqliteBaselineStore;

#[test]
fn test_init_then_poll_against_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sis_poller.sqlite3");

    let initial = FakeProvider::new().with_listing("UU", &[("UU_A.xml", 100), ("UU_B.xml", 200)]);
    {
        let mut store = SqliteBaselineStore::create(&path).unwrap();
        let outcome = run_init(&initial, &mut store, &sources(&["UU"])).unwrap();
        assert_eq!(outcome.counts.added, 2);
    }

    let later = FakeProvider::new().with_listing("UU", &[("UU_A.xml", 100), ("UU_B.xml", 250), ("UU_C.xml", 50)]);
    let notifier = RecordingNotifier::new();
    let mut store = SqliteBaselineStore::open(&path).unwrap();
    let outcome = run_poll(&later, &mut store, &notifier, &sources(&["UU"]), "production").unwrap();

    assert_eq!(outcome.report, "Adding: UU_C.xml\nUpdated: UU_B.xml\n");
    assert_eq!(notifier.sent().len(), 1);

    let baseline = store.get_all().unwrap();
    assert_eq!(baseline.get("UU_B.xml"), Some(ts(250)));
    assert_eq!(baseline.get("UU_C.xml"), Some(ts(50)));

    // Same snapshot again: idempotent, no second notification.
    let outcome = run_poll(&later, &mut store, &notifier, &sources(&["UU"]), "production").unwrap();
    assert_eq!(outcome.report, "");
    assert_eq!(notifier.sent().len(), 1);
}
