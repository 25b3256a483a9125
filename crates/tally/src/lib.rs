// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! An instrumented key-value cache.
//!
//! This crate layers call counting and call history over any
//! [`KeyedStore`], replays that history as a readable trace, and caches expensive
//! page fetches with a TTL.
//!
//! # Quick Start
//!
//! ```
//! use tally::{InMemoryStore, InstrumentedCache, OperationId};
//! use tick::Clock;
//!
//! # futures::executor::block_on(async {
//! let clock = Clock::new_frozen();
//! let cache = InstrumentedCache::new(InMemoryStore::new(clock.clone()), clock);
//!
//! let first = cache.store("a").await?;
//! let second = cache.store(5).await?;
//!
//! let replay = cache.replay(&OperationId::STORE).await?;
//! assert_eq!(
//!     replay.to_string(),
//!     format!("store was called 2 times:\nstore(*('a',)) -> {first}\nstore(*(5,)) -> {second}")
//! );
//! # Ok::<(), tally::Error>(())
//! # });
//! ```
//!
//! # Components
//!
//! - [`InstrumentedCache`]: `store` values under random keys and read them back typed.
//!   Each `store` call is counted and recorded.
//! - [`Replayer`]: turn an operation's recorded history into a [`Replay`].
//! - [`FetchCache`]: serve pages from cache for a TTL, counting every access per URL.
//! - [`instrument`]: the counting and history layers, usable around any
//!   [`layered::Service`].
//! - [`StoreWrapper`]: bounds every store call by a timeout and logs it.
//!
//! # Stores
//!
//! Anything implementing [`KeyedStore`] works. The `memory` feature (on by default)
//! re-exports [`InMemoryStore`]; the `tally_redis` crate provides a Redis-backed store.
//!
//! # Time
//!
//! Every component takes a [`tick::Clock`]. Store timeouts race timers on it, and
//! [`InMemoryStore`] evaluates TTLs against it, so tests control time with
//! `tick::ClockControl` rather than sleeping.
//!
//! # Logging
//!
//! Every store call emits a `store.event` through [`tracing`] with the operation, key,
//! outcome and duration: `DEBUG` on success, `WARN` on timeout, `ERROR` on failure.
//! Page caching logs `cache.hit` and `cache.miss` at `DEBUG`.
//!
//! # Concurrency
//!
//! Single-key store operations are atomic, but recording a call touches three keys.
//! Concurrent calls to one operation may interleave their history entries, so
//! `{op}:inputs` and `{op}:outputs` stay parallel only when calls are serialized.

mod builder;
mod cache;
pub mod decode;
mod fetch;
#[cfg(feature = "http")]
mod http;
pub mod instrument;
mod key;
mod operation;
mod payload;
mod replay;
mod telemetry;
mod wrapper;

pub use builder::{DEFAULT_PAGE_TTL, DEFAULT_STORE_TIMEOUT, FetchCacheBuilder, InstrumentedCacheBuilder};
pub use cache::InstrumentedCache;
pub use fetch::{ACCESS_COUNT_PREFIX, CACHED_PAGE_PREFIX, FetchCache, PageFetcher};
#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub use http::{DEFAULT_REQUEST_TIMEOUT, HttpFetcher, HttpFetcherBuilder};
pub use key::Key;
pub use operation::OperationId;
pub use payload::Payload;
pub use replay::{CallPair, Replay, Replayer};
#[cfg(feature = "memory")]
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
pub use tally_memory::{InMemoryStore, InMemoryStoreBuilder};
#[cfg(feature = "test-util")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub use tally_store::testing::{MockStore, StoreOp};
pub use tally_store::{Entry, Error, ErrorKind, KeyedStore, Result};
pub use wrapper::StoreWrapper;
