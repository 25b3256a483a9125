// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{borrow::Cow, fmt};

/// The stable name of an instrumented operation.
///
/// The name roots the store keys the instrumentation writes: the call counter lives
/// under the name itself and the history under `{name}:inputs` and `{name}:outputs`.
///
/// # Examples
///
/// ```
/// use tally::OperationId;
///
/// let op = OperationId::new("store");
/// assert_eq!(op.counter_key(), "store");
/// assert_eq!(op.inputs_key(), "store:inputs");
/// assert_eq!(op.outputs_key(), "store:outputs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationId(Cow<'static, str>);

impl OperationId {
    /// The operation behind [`InstrumentedCache::store`](crate::InstrumentedCache::store).
    pub const STORE: Self = Self(Cow::Borrowed("store"));

    /// Creates an operation identity from its name.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Returns the operation name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the key of the call counter.
    #[must_use]
    pub fn counter_key(&self) -> &str {
        &self.0
    }

    /// Returns the key of the list of recorded inputs.
    #[must_use]
    pub fn inputs_key(&self) -> String {
        format!("{}:inputs", self.0)
    }

    /// Returns the key of the list of recorded outputs.
    #[must_use]
    pub fn outputs_key(&self) -> String {
        format!("{}:outputs", self.0)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for OperationId {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for OperationId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
