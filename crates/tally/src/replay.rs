// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Reconstructing call traces from recorded history.

use std::fmt;

use tally_store::{Error, KeyedStore};

use crate::{OperationId, decode};

/// One recorded call: its rendered input and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPair {
    /// The argument tuple, e.g. `('a',)`.
    pub input: String,
    /// The result, e.g. the key a value was stored under.
    pub output: String,
}

/// The call trace of one operation.
///
/// Renders as a header line followed by one line per recorded call:
///
/// ```text
/// store was called 2 times:
/// store(*('a',)) -> 3c2f...
/// store(*(5,)) -> 9a71...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    operation: OperationId,
    count: i64,
    calls: Vec<CallPair>,
}

impl Replay {
    /// Returns the operation this trace belongs to.
    #[must_use]
    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    /// Returns the call count as recorded by the counter.
    ///
    /// This can exceed `calls().len()` when calls failed before their output was recorded.
    #[must_use]
    pub fn count(&self) -> i64 {
        self.count
    }

    /// Returns the recorded calls in call order.
    #[must_use]
    pub fn calls(&self) -> &[CallPair] {
        &self.calls
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was called {} times:", self.operation, self.count)?;
        for call in &self.calls {
            write!(f, "\n{}(*{}) -> {}", self.operation, call.input, call.output)?;
        }
        Ok(())
    }
}

/// Reads an operation's history back from a store.
///
/// The replayer only reads; it never modifies counters or history.
#[derive(Debug, Clone)]
pub struct Replayer<S> {
    store: S,
}

impl<S> Replayer<S>
where
    S: KeyedStore,
{
    /// Creates a replayer over `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Builds the call trace of `operation`.
    ///
    /// Inputs and outputs are paired by position up to the shorter list; inputs of calls
    /// that never recorded an output are dropped. An absent counter counts as zero.
    ///
    /// # Errors
    ///
    /// Fails with a store error if the store is unavailable, or a decode error if the
    /// counter or a history item is malformed.
    pub async fn replay(&self, operation: &OperationId) -> Result<Replay, Error> {
        let count = match self.store.get(operation.counter_key()).await? {
            Some(raw) => decode::integer(raw)?,
            None => 0,
        };
        let inputs = self.store.read_list(&operation.inputs_key()).await?;
        let outputs = self.store.read_list(&operation.outputs_key()).await?;

        if inputs.len() != outputs.len() {
            tracing::debug!(
                operation = operation.as_str(),
                inputs = inputs.len(),
                outputs = outputs.len(),
                "history lists differ in length"
            );
        }

        let calls = inputs
            .into_iter()
            .zip(outputs)
            .map(|(input, output)| {
                Ok(CallPair {
                    input: decode::utf8(input)?,
                    output: decode::utf8(output)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Replay {
            operation: operation.clone(),
            count,
            calls,
        })
    }
}
