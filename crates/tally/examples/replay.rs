// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Stores a few values and prints the recorded call trace.

use tally::{InMemoryStore, InstrumentedCache, OperationId};
use tick::Clock;

#[tokio::main]
async fn main() -> Result<(), tally::Error> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let clock = Clock::new_tokio();
    let cache = InstrumentedCache::new(InMemoryStore::new(clock.clone()), clock);

    cache.store("foo").await?;
    cache.store(42).await?;
    let key = cache.store(b"bar".as_slice()).await?;

    println!("{key} holds {:?}", cache.get(&key).await?);
    println!("{}", cache.replay(&OperationId::STORE).await?);

    Ok(())
}
