// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `InMemoryStore`.

use std::time::Duration;

use futures::executor::block_on;
use tally_memory::InMemoryStore;
use tally_store::{ErrorKind, KeyedStore};
use tick::{Clock, ClockControl};

fn store_with_control() -> (InMemoryStore, ClockControl) {
    let control = ClockControl::new();
    (InMemoryStore::new(control.to_clock()), control)
}

#[test]
fn put_then_get_returns_payload() {
    block_on(async {
        let store = InMemoryStore::new(Clock::new_frozen());
        store.put("k", b"hello".to_vec(), None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"hello".to_vec()));
    });
}

#[test]
fn get_missing_key_returns_none() {
    block_on(async {
        let store = InMemoryStore::new(Clock::new_frozen());
        assert_eq!(store.get("never-stored").await.unwrap(), None);
    });
}

#[test]
fn put_overwrites_value_and_ttl() {
    block_on(async {
        let (store, control) = store_with_control();
        store.put("k", b"old".to_vec(), Some(Duration::from_secs(1))).await.unwrap();
        store.put("k", b"new".to_vec(), None).await.unwrap();

        control.advance(Duration::from_secs(5));
        assert_eq!(store.get("k").await.unwrap(), Some(b"new".to_vec()));
    });
}

#[test]
fn entry_is_readable_until_ttl_elapses() {
    block_on(async {
        let (store, control) = store_with_control();
        store.put("k", b"v".to_vec(), Some(Duration::from_secs(10))).await.unwrap();

        control.advance(Duration::from_secs(9));
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));

        control.advance(Duration::from_secs(1));
        assert_eq!(store.get("k").await.unwrap(), None);
    });
}

#[test]
fn expired_entry_is_absent_before_purge() {
    block_on(async {
        let (store, control) = store_with_control();
        store.put("a", b"1".to_vec(), Some(Duration::from_secs(1))).await.unwrap();
        store.put("b", b"2".to_vec(), Some(Duration::from_secs(1))).await.unwrap();
        store.put("c", b"3".to_vec(), None).await.unwrap();

        control.advance(Duration::from_secs(2));
        // Still physically present, but reads must not see it.
        assert_eq!(store.len(), Some(3));
        assert_eq!(store.get("a").await.unwrap(), None);

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), Some(1));
        assert_eq!(store.get("c").await.unwrap(), Some(b"3".to_vec()));
    });
}

#[test]
fn increment_starts_at_zero_and_is_readable_as_text() {
    block_on(async {
        let store = InMemoryStore::new(Clock::new_frozen());
        assert_eq!(store.increment("count:x").await.unwrap(), 1);
        assert_eq!(store.increment("count:x").await.unwrap(), 2);
        assert_eq!(store.increment("count:x").await.unwrap(), 3);
        assert_eq!(store.get("count:x").await.unwrap(), Some(b"3".to_vec()));
    });
}

#[test]
fn increment_continues_from_stored_integer_text() {
    block_on(async {
        let store = InMemoryStore::new(Clock::new_frozen());
        store.put("n", b"41".to_vec(), None).await.unwrap();
        assert_eq!(store.increment("n").await.unwrap(), 42);
    });
}

#[test]
fn increment_on_text_fails_and_leaves_value() {
    block_on(async {
        let store = InMemoryStore::new(Clock::new_frozen());
        store.put("n", b"hello".to_vec(), None).await.unwrap();

        let err = store.increment("n").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(store.get("n").await.unwrap(), Some(b"hello".to_vec()));
    });
}

#[test]
fn increment_preserves_existing_ttl() {
    block_on(async {
        let (store, control) = store_with_control();
        store.put("n", b"1".to_vec(), Some(Duration::from_secs(10))).await.unwrap();

        control.advance(Duration::from_secs(5));
        assert_eq!(store.increment("n").await.unwrap(), 2);

        control.advance(Duration::from_secs(5));
        assert_eq!(store.get("n").await.unwrap(), None);
    });
}

#[test]
fn increment_after_expiry_restarts_from_zero() {
    block_on(async {
        let (store, control) = store_with_control();
        store.put("n", b"7".to_vec(), Some(Duration::from_secs(1))).await.unwrap();

        control.advance(Duration::from_secs(1));
        assert_eq!(store.increment("n").await.unwrap(), 1);
    });
}

#[test]
fn lists_keep_append_order() {
    block_on(async {
        let store = InMemoryStore::new(Clock::new_frozen());
        store.append_to_list("l", b"a".to_vec()).await.unwrap();
        store.append_to_list("l", b"b".to_vec()).await.unwrap();
        store.append_to_list("l", b"c".to_vec()).await.unwrap();

        assert_eq!(
            store.read_list("l").await.unwrap(),
            vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]
        );
        assert!(store.read_list("missing").await.unwrap().is_empty());
    });
}

#[test]
fn flush_all_clears_values_counters_and_lists() {
    block_on(async {
        let store = InMemoryStore::new(Clock::new_frozen());
        store.put("k", b"v".to_vec(), None).await.unwrap();
        store.increment("c").await.unwrap();
        store.append_to_list("l", b"x".to_vec()).await.unwrap();
        assert_eq!(store.is_empty(), Some(false));

        store.flush_all().await.unwrap();

        assert_eq!(store.is_empty(), Some(true));
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.read_list("l").await.unwrap().is_empty());
    });
}

#[test]
fn clones_share_state() {
    block_on(async {
        let store = InMemoryStore::new(Clock::new_frozen());
        let clone = store.clone();
        store.put("k", b"v".to_vec(), None).await.unwrap();
        assert_eq!(clone.get("k").await.unwrap(), Some(b"v".to_vec()));
    });
}

#[test]
fn builder_applies_name() {
    let store = InMemoryStore::builder(Clock::new_frozen())
        .initial_capacity(16)
        .name("pages")
        .build();
    assert_eq!(store.name(), Some("pages"));
    assert_eq!(store.len(), Some(0));
}

#[test]
fn concurrent_increments_are_not_lost() {
    let store = InMemoryStore::new(Clock::new_frozen());

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let store = store.clone();
            scope.spawn(move || {
                for _ in 0..100 {
                    block_on(store.increment("c")).unwrap();
                }
            });
        }
    });

    assert_eq!(block_on(store.get("c")).unwrap(), Some(b"800".to_vec()));
}
