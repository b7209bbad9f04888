#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use sispoll_core::baseline::{BaselineStore, MemoryBaselineStore};
use sispoll_core::model::{Baseline, FetchedRecord, SnapshotRecord, Timestamp};
use sispoll_core::{commit, reconcile};

fn resource_id() -> impl Strategy<Value = String> {
    prop_oneof![Just("UU"), Just("WY"), Just("IW"), Just("US")]
        .prop_flat_map(|net| "[A-Z]{2,4}".prop_map(move |sta| format!("{}_{}.xml", net, sta)))
}

fn snapshot() -> impl Strategy<Value = Vec<FetchedRecord>> {
    prop::collection::vec(
        (resource_id(), 0i64..1_000).prop_map(|(id, t)| FetchedRecord::new(id, Timestamp::from_unix_seconds(t))),
        0..40,
    )
}

fn baseline() -> impl Strategy<Value = Baseline> {
    prop::collection::vec((resource_id(), 0i64..1_000), 0..40).prop_map(|rows| {
        let mut baseline = Baseline::new();
        for (id, t) in rows {
            baseline.set(id, Timestamp::from_unix_seconds(t));
        }
        baseline
    })
}

proptest! {
    #[test]
    fn prop_reconcile_is_idempotent(base in baseline(), fetched in snapshot()) {
        let mut store = MemoryBaselineStore::with_records(base.iter());
        let first = reconcile(&fetched, &store.get_all().unwrap());
        commit(&mut store, &first.change_set).unwrap();

        let second = reconcile(&fetched, &store.get_all().unwrap());
        prop_assert!(second.change_set.is_empty());
    }

    #[test]
    fn prop_committed_timestamps_never_decrease(base in baseline(), fetched in snapshot()) {
        let mut store = MemoryBaselineStore::with_records(base.iter());
        let result = reconcile(&fetched, &base);
        commit(&mut store, &result.change_set).unwrap();

        let after = store.get_all().unwrap();
        for SnapshotRecord { resource_id, last_modified } in base.iter() {
            let now = after.get(&resource_id).unwrap();
            prop_assert!(now >= last_modified);
        }
    }

    #[test]
    fn prop_additions_and_updates_are_disjoint(base in baseline(), fetched in snapshot()) {
        let result = reconcile(&fetched, &base);
        for added in &result.change_set.additions {
            prop_assert!(!base.contains(&added.resource_id));
            prop_assert!(result
                .change_set
                .updates
                .iter()
                .all(|u| u.resource_id != added.resource_id));
        }
        for update in &result.change_set.updates {
            prop_assert!(update.new_timestamp > update.old_timestamp);
        }
    }

    #[test]
    fn prop_order_of_fetch_does_not_matter(base in baseline(), fetched in snapshot()) {
        let mut reversed = fetched.clone();
        reversed.reverse();
        let forward = reconcile(&fetched, &base);
        let backward = reconcile(&reversed, &base);
        prop_assert_eq!(forward.change_set, backward.change_set);
    }
}
