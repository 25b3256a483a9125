// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tally_store::{Error, KeyedStore};

use crate::error::map_redis_error;

/// Environment variable read by [`RedisStore::from_env`].
pub const URL_ENV_VAR: &str = "REDIS_URL";

/// Server address used by [`RedisStore::from_env`] when [`URL_ENV_VAR`] is unset.
pub const DEFAULT_URL: &str = "redis://127.0.0.1:6379/";

/// How long establishing a connection may take, unless configured otherwise.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// How long the server may take to answer a command, unless configured otherwise.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// A [`KeyedStore`] backed by a Redis server.
///
/// Cloning is cheap; clones share one multiplexed connection that reconnects on its
/// own after the server goes away. While it is down, every operation fails with
/// [`ErrorKind::StoreUnavailable`](tally_store::ErrorKind::StoreUnavailable).
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connects to the Redis server at `url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns a store-unavailable error if the URL is invalid or the server cannot be reached.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        Self::builder(url).connect().await
    }

    /// Creates a builder for a connection to the Redis server at `url`.
    #[must_use]
    pub fn builder(url: impl Into<String>) -> RedisStoreBuilder {
        RedisStoreBuilder {
            url: url.into(),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    /// Connects to the server named by the `REDIS_URL` environment variable, falling
    /// back to a local server on the default port.
    ///
    /// # Errors
    ///
    /// Returns a store-unavailable error if the server cannot be reached.
    pub async fn from_env() -> Result<Self, Error> {
        let url = std::env::var(URL_ENV_VAR).unwrap_or_else(|_| DEFAULT_URL.to_owned());
        Self::connect(&url).await
    }
}

/// Builder for [`RedisStore`].
///
/// Both timeouts apply on every connection, including reconnects, so a store used on
/// its own never waits on the operating system's TCP timeout.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use tally_redis::RedisStore;
///
/// # async fn example() -> Result<(), tally_store::Error> {
/// let store = RedisStore::builder("redis://127.0.0.1:6379/")
///     .connection_timeout(Duration::from_secs(1))
///     .response_timeout(Duration::from_millis(500))
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RedisStoreBuilder {
    url: String,
    connection_timeout: Duration,
    response_timeout: Duration,
}

impl RedisStoreBuilder {
    /// Sets how long establishing a connection may take.
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets how long the server may take to answer a command.
    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Connects to the server.
    ///
    /// # Errors
    ///
    /// Returns a store-unavailable error if the URL is invalid or the server cannot be
    /// reached within the connection timeout.
    pub async fn connect(self) -> Result<RedisStore, Error> {
        let client = redis::Client::open(self.url.as_str()).map_err(map_redis_error)?;
        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(self.connection_timeout)
            .set_response_timeout(self.response_timeout);
        let conn = ConnectionManager::new_with_config(client, config)
            .await
            .map_err(map_redis_error)?;

        tracing::debug!(store.url = self.url.as_str(), "connected to redis");
        Ok(RedisStore { conn })
    }
}

impl KeyedStore for RedisStore {
    async fn put(&self, key: &str, payload: Vec<u8>, ttl: Option<Duration>) -> Result<(), Error> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => {
                conn.pset_ex::<_, _, ()>(key, payload, ttl_millis(ttl))
                    .await
                    .map_err(map_redis_error)
            }
            None => conn.set::<_, _, ()>(key, payload).await.map_err(map_redis_error),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(map_redis_error)
    }

    async fn increment(&self, key: &str) -> Result<i64, Error> {
        let mut conn = self.conn.clone();
        conn.incr(key, 1_i64).await.map_err(map_redis_error)
    }

    async fn append_to_list(&self, key: &str, item: Vec<u8>) -> Result<(), Error> {
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(key, item).await.map_err(map_redis_error)
    }

    async fn read_list(&self, key: &str) -> Result<Vec<Vec<u8>>, Error> {
        let mut conn = self.conn.clone();
        conn.lrange(key, 0, -1).await.map_err(map_redis_error)
    }

    async fn flush_all(&self) -> Result<(), Error> {
        let mut conn = self.conn.clone();
        let (): () = redis::cmd("FLUSHDB").query_async(&mut conn).await.map_err(map_redis_error)?;

        tracing::debug!("flushed redis database");
        Ok(())
    }
}

/// Converts a TTL to whole milliseconds, rounding anything shorter up to 1 ms.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}
