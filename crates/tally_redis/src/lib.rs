// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(docsrs, feature(doc_cfg))]

//! Redis-backed keyed store.
//!
//! [`RedisStore`] implements [`KeyedStore`](tally_store::KeyedStore) on top of a Redis
//! server reached through a multiplexed, auto-reconnecting connection. Expiry, counters
//! and lists are delegated to the server's own `PSETEX`, `INCR`, `RPUSH` and `LRANGE`.
//!
//! ```no_run
//! use tally_redis::RedisStore;
//! use tally_store::KeyedStore;
//!
//! # async fn demo() -> tally_store::Result<()> {
//! let store = RedisStore::connect("redis://127.0.0.1:6379/").await?;
//! store.append_to_list("store:inputs", b"('a',)".to_vec()).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod store;

#[doc(inline)]
pub use store::{
    DEFAULT_CONNECTION_TIMEOUT, DEFAULT_RESPONSE_TIMEOUT, DEFAULT_URL, RedisStore, RedisStoreBuilder, URL_ENV_VAR,
};
