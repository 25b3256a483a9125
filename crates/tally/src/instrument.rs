// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Call counting and call history as composable layers.
//!
//! Instrumentation is a stack of [`layered`] middleware around a base operation:
//!
//! - [`CountCallsLayer`] increments a counter before every call, so the count grows
//!   exactly once per call even if everything after it fails.
//! - [`CallHistoryLayer`] appends the call's input to `{op}:inputs` before the call and
//!   the result to `{op}:outputs` after it succeeds. A failed call leaves an input
//!   without a matching output.
//!
//! [`instrument`] stacks both, counting outermost.
//!
//! The history appends and the wrapped call touch different keys and are not atomic.
//! Concurrent calls to one operation may interleave their appends, so callers that
//! need strictly parallel histories must serialize calls per operation.
//!
//! # Examples
//!
//! ```
//! use layered::{Execute, Service};
//! use tally::instrument::instrument;
//! use tally::{KeyedStore, OperationId, Payload};
//! use tally_store::testing::MockStore;
//!
//! # futures::executor::block_on(async {
//! let store = MockStore::new();
//! let double = Execute::new(|p: Payload| async move {
//!     match p {
//!         Payload::Integer(v) => Ok::<_, tally::Error>(v * 2),
//!         _ => Ok(0),
//!     }
//! });
//!
//! let service = instrument(store.clone(), OperationId::new("double"), double);
//! assert_eq!(service.execute(Payload::from(21)).await?, 42);
//!
//! assert_eq!(store.get("double").await?, Some(b"1".to_vec()));
//! assert_eq!(store.list("double:inputs"), vec![b"(21,)".to_vec()]);
//! assert_eq!(store.list("double:outputs"), vec![b"42".to_vec()]);
//! # Ok::<(), tally::Error>(())
//! # });
//! ```

use layered::{Layer, Service, Stack};
use tally_store::{Error, KeyedStore};

use crate::{Key, OperationId, Payload};

/// Chooses the counter a call increments.
pub trait CounterKey<In>: Send + Sync {
    /// Returns the key of the counter for a call with `input`.
    fn counter_key(&self, input: &In) -> String;
}

/// Every call of the operation shares one counter named after it.
impl<In> CounterKey<In> for OperationId {
    fn counter_key(&self, _input: &In) -> String {
        OperationId::counter_key(self).to_owned()
    }
}

/// One counter per distinct input, named `{prefix}{input}`.
///
/// # Examples
///
/// ```
/// use tally::instrument::{CounterKey, PrefixedKey};
///
/// let key = PrefixedKey::new("count:");
/// assert_eq!(key.counter_key(&"http://example.com"), "count:http://example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedKey {
    prefix: String,
}

impl PrefixedKey {
    /// Creates a key strategy that prepends `prefix` to the input.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Returns the prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<In> CounterKey<In> for PrefixedKey
where
    In: AsRef<str>,
{
    fn counter_key(&self, input: &In) -> String {
        format!("{}{}", self.prefix, input.as_ref())
    }
}

/// An input that can be written to call history.
pub trait CallInput {
    /// Renders the call's argument tuple, e.g. `('a',)`.
    fn to_history(&self) -> String;
}

impl CallInput for Payload {
    fn to_history(&self) -> String {
        format!("({},)", self.literal())
    }
}

impl CallInput for String {
    fn to_history(&self) -> String {
        Payload::from(self.as_str()).to_history()
    }
}

/// An output that can be written to call history.
pub trait CallOutput {
    /// Renders the call's result.
    fn to_history(&self) -> String;
}

impl CallOutput for Key {
    fn to_history(&self) -> String {
        self.as_str().to_owned()
    }
}

impl CallOutput for String {
    fn to_history(&self) -> String {
        self.clone()
    }
}

impl CallOutput for i64 {
    fn to_history(&self) -> String {
        self.to_string()
    }
}

/// Middleware that increments a counter before each call.
#[derive(Debug, Clone)]
pub struct CountCalls<S, St, K> {
    inner: S,
    store: St,
    key: K,
}

/// Layer producing [`CountCalls`].
#[derive(Debug, Clone)]
pub struct CountCallsLayer<St, K> {
    store: St,
    key: K,
}

impl<St, K> CountCallsLayer<St, K> {
    /// Counts calls in `store` under the counter chosen by `key`.
    #[must_use]
    pub fn new(store: St, key: K) -> Self {
        Self { store, key }
    }
}

impl<S, St, K> Layer<S> for CountCallsLayer<St, K>
where
    St: Clone,
    K: Clone,
{
    type Service = CountCalls<S, St, K>;

    fn layer(&self, inner: S) -> Self::Service {
        CountCalls {
            inner,
            store: self.store.clone(),
            key: self.key.clone(),
        }
    }
}

impl<In, O, S, St, K> Service<In> for CountCalls<S, St, K>
where
    In: Send,
    S: Service<In, Out = Result<O, Error>>,
    St: KeyedStore,
    K: CounterKey<In>,
{
    type Out = Result<O, Error>;

    async fn execute(&self, input: In) -> Self::Out {
        let key = self.key.counter_key(&input);
        let count = self.store.increment(&key).await?;
        tracing::trace!(counter.key = key.as_str(), counter.value = count, "call counted");

        self.inner.execute(input).await
    }
}

/// Middleware that records each call's input and output.
#[derive(Debug, Clone)]
pub struct CallHistory<S, St> {
    inner: S,
    store: St,
    inputs_key: String,
    outputs_key: String,
}

/// Layer producing [`CallHistory`].
#[derive(Debug, Clone)]
pub struct CallHistoryLayer<St> {
    store: St,
    operation: OperationId,
}

impl<St> CallHistoryLayer<St> {
    /// Records history for `operation` in `store`.
    #[must_use]
    pub fn new(store: St, operation: OperationId) -> Self {
        Self { store, operation }
    }
}

impl<S, St> Layer<S> for CallHistoryLayer<St>
where
    St: Clone,
{
    type Service = CallHistory<S, St>;

    fn layer(&self, inner: S) -> Self::Service {
        CallHistory {
            inner,
            store: self.store.clone(),
            inputs_key: self.operation.inputs_key(),
            outputs_key: self.operation.outputs_key(),
        }
    }
}

impl<In, O, S, St> Service<In> for CallHistory<S, St>
where
    In: CallInput + Send,
    O: CallOutput + Send,
    S: Service<In, Out = Result<O, Error>>,
    St: KeyedStore,
{
    type Out = Result<O, Error>;

    async fn execute(&self, input: In) -> Self::Out {
        let recorded_input = input.to_history();
        self.store
            .append_to_list(&self.inputs_key, recorded_input.into_bytes())
            .await?;

        let output = self.inner.execute(input).await?;

        self.store
            .append_to_list(&self.outputs_key, output.to_history().into_bytes())
            .await?;
        tracing::trace!(history.key = self.outputs_key.as_str(), "call recorded");

        Ok(output)
    }
}

/// A service wrapped in call counting and call history.
pub type Instrumented<S, St> = CountCalls<CallHistory<S, St>, St, OperationId>;

/// Wraps `service` so every call is counted under `operation` and recorded in its history.
///
/// Counting runs first, then the input is recorded, then `service` runs, then its
/// output is recorded.
pub fn instrument<S, St>(store: St, operation: OperationId, service: S) -> Instrumented<S, St>
where
    St: Clone,
{
    (
        CountCallsLayer::new(store.clone(), operation.clone()),
        CallHistoryLayer::new(store, operation),
        service,
    )
        .into_service()
}
