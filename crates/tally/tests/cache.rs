// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `InstrumentedCache`.

use std::time::Duration;

use futures::executor::block_on;
use tally::{ErrorKind, InMemoryStore, InstrumentedCache, KeyedStore, OperationId, Payload};
use tick::{Clock, ClockControl};

fn memory_cache() -> InstrumentedCache<InMemoryStore> {
    let clock = Clock::new_frozen();
    InstrumentedCache::new(InMemoryStore::new(clock.clone()), clock)
}

#[test]
fn text_round_trips() {
    block_on(async {
        let cache = memory_cache();
        let key = cache.store("héllo wörld").await.unwrap();
        assert_eq!(cache.get_as_string(&key).await.unwrap().as_deref(), Some("héllo wörld"));
    });
}

#[test]
fn bytes_round_trip() {
    block_on(async {
        let cache = memory_cache();
        let data = vec![0_u8, 159, 146, 150, 255];
        let key = cache.store(data.clone()).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(data));
    });
}

#[test]
fn integers_round_trip() {
    block_on(async {
        let cache = memory_cache();
        for value in [0_i64, 5, -17, i64::MAX, i64::MIN] {
            let key = cache.store(value).await.unwrap();
            assert_eq!(cache.get_as_integer(&key).await.unwrap(), Some(value));
        }
    });
}

#[test]
fn floats_round_trip() {
    block_on(async {
        let cache = memory_cache();
        for value in [0.1_f64, 1.0, -2.5, 1e300, f64::MIN_POSITIVE] {
            let key = cache.store(value).await.unwrap();
            let read = cache.get_as_float(&key).await.unwrap().expect("value should be present");
            assert_eq!(read.to_bits(), value.to_bits());
        }
    });
}

#[test]
fn payload_values_round_trip_through_raw_get() {
    block_on(async {
        let cache = memory_cache();
        for payload in [Payload::from("a"), Payload::from(b"raw"), Payload::from(7), Payload::from(2.5)] {
            let key = cache.store(payload.clone()).await.unwrap();
            assert_eq!(cache.get(&key).await.unwrap(), Some(payload.to_bytes()));
        }
    });
}

#[test]
fn get_as_integer_on_text_is_a_decode_error() {
    block_on(async {
        let cache = memory_cache();
        let key = cache.store("forty-two").await.unwrap();
        assert_eq!(cache.get_as_integer(&key).await.unwrap_err().kind(), ErrorKind::Decode);
    });
}

#[test]
fn get_as_string_on_invalid_utf8_is_a_decode_error() {
    block_on(async {
        let cache = memory_cache();
        let key = cache.store(vec![0xff_u8, 0xfe]).await.unwrap();
        assert_eq!(cache.get_as_string(&key).await.unwrap_err().kind(), ErrorKind::Decode);
    });
}

#[test]
fn never_stored_key_is_absent() {
    block_on(async {
        let cache = memory_cache();
        let random = tally::Key::generate();
        assert_eq!(cache.get(&random).await.unwrap(), None);
        assert_eq!(cache.get_as_string(&random).await.unwrap(), None);
        assert_eq!(cache.get_as_integer(&random).await.unwrap(), None);
    });
}

#[test]
fn get_with_applies_custom_decoder() {
    block_on(async {
        let cache = memory_cache();
        let key = cache.store("abc").await.unwrap();
        let len = cache.get_with(&key, |bytes| Ok(bytes.len())).await.unwrap();
        assert_eq!(len, Some(3));
    });
}

#[test]
fn n_calls_count_n_with_parallel_history() {
    block_on(async {
        let cache = memory_cache();
        let store = cache.store_handle();

        for n in 0..7 {
            cache.store(n).await.unwrap();
        }

        assert_eq!(cache.call_count(&OperationId::STORE).await.unwrap(), 7);
        assert_eq!(store.read_list("store:inputs").await.unwrap().len(), 7);
        assert_eq!(store.read_list("store:outputs").await.unwrap().len(), 7);
    });
}

#[test]
fn call_count_of_unknown_operation_is_zero() {
    block_on(async {
        let cache = memory_cache();
        assert_eq!(cache.call_count(&OperationId::new("nothing")).await.unwrap(), 0);
    });
}

#[test]
fn replay_renders_calls_in_order() {
    block_on(async {
        let cache = memory_cache();
        let first = cache.store("a").await.unwrap();
        let second = cache.store(5).await.unwrap();

        let replay = cache.replay(&OperationId::STORE).await.unwrap();

        assert_eq!(replay.count(), 2);
        assert_eq!(
            replay.to_string(),
            format!("store was called 2 times:\nstore(*('a',)) -> {first}\nstore(*(5,)) -> {second}")
        );
    });
}

#[test]
fn flush_all_resets_counts_and_history() {
    block_on(async {
        let cache = memory_cache();
        let key = cache.store("a").await.unwrap();

        cache.flush_all().await.unwrap();

        assert_eq!(cache.get(&key).await.unwrap(), None);
        assert_eq!(cache.call_count(&OperationId::STORE).await.unwrap(), 0);
        assert_eq!(
            cache.replay(&OperationId::STORE).await.unwrap().to_string(),
            "store was called 0 times:"
        );
    });
}

#[test]
fn expired_entries_read_as_absent() {
    block_on(async {
        let control = ClockControl::new();
        let clock = control.to_clock();
        let cache = InstrumentedCache::new(InMemoryStore::new(clock.clone()), clock);
        let store = cache.store_handle();

        store.put("k", b"v".to_vec(), Some(Duration::from_secs(3))).await.unwrap();
        control.advance(Duration::from_secs(3));

        // Still physically present until a read or purge drops it.
        assert_eq!(store.inner().len(), Some(1));
        assert_eq!(cache.get("k").await.unwrap(), None);
    });
}
