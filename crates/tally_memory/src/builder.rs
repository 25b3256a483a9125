// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory stores.

use tick::Clock;

use crate::store::InMemoryStore;

/// Builder for configuring an `InMemoryStore`.
///
/// # Examples
///
/// ```
/// use tally_memory::InMemoryStore;
/// use tick::Clock;
///
/// let store = InMemoryStore::builder(Clock::new_frozen())
///     .initial_capacity(128)
///     .name("sessions")
///     .build();
/// ```
#[derive(Debug)]
pub struct InMemoryStoreBuilder {
    pub(crate) clock: Clock,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) name: Option<String>,
}

impl InMemoryStoreBuilder {
    /// Creates a new builder using `clock` for all expiry decisions.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            initial_capacity: None,
            name: None,
        }
    }

    /// Sets the initial capacity (pre-allocation hint) for stored values.
    ///
    /// The store may still grow beyond this size.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets a name for the store.
    ///
    /// The name appears in log events emitted by the store.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured `InMemoryStore`.
    #[must_use]
    pub fn build(self) -> InMemoryStore {
        InMemoryStore::from_builder(self)
    }
}
