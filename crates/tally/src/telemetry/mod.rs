// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured log events for store operations.

use std::error::Error as _;
use std::time::Duration;

use tally_store::Error;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
pub(crate) const STORE_OPERATION: &str = "store.operation";
#[cfg(test)]
pub(crate) const STORE_KEY: &str = "store.key";
#[cfg(test)]
pub(crate) const STORE_OUTCOME: &str = "store.outcome";
#[cfg(test)]
pub(crate) const DURATION_NS: &str = "duration_ns";

/// The store operation an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreOperation {
    Put,
    Get,
    Increment,
    Append,
    ReadList,
    FlushAll,
}

impl StoreOperation {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Put => "put",
            Self::Get => "get",
            Self::Increment => "increment",
            Self::Append => "append_to_list",
            Self::ReadList => "read_list",
            Self::FlushAll => "flush_all",
        }
    }
}

/// How a store operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreOutcome {
    Ok,
    Timeout,
    Error,
}

impl StoreOutcome {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Timeout => "timeout",
            Self::Error => "error",
        }
    }
}

pub(crate) fn emit(operation: StoreOperation, key: Option<&str>, outcome: StoreOutcome, duration: Duration) {
    let op = operation.as_str();
    let out = outcome.as_str();
    let duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

    // Field names must match the constants above.
    macro_rules! emit_event {
        ($level:ident) => {
            tracing::$level!(
                store.operation = op,
                store.key = key,
                store.outcome = out,
                duration_ns,
                "store.event"
            )
        };
    }

    match outcome {
        StoreOutcome::Ok => emit_event!(debug),
        StoreOutcome::Timeout => emit_event!(warn),
        StoreOutcome::Error => emit_event!(error),
    }
}

/// Renders the causes of `err` on one line, outermost first, joined by `": "`.
///
/// Each cause contributes only the first line of its message so that log fields never
/// span lines.
pub(crate) fn cause_chain(err: &Error) -> String {
    let mut causes = Vec::new();
    let mut next = err.source();
    while let Some(cause) = next {
        let message = cause.to_string();
        causes.push(message.lines().next().unwrap_or_default().to_owned());
        next = cause.source();
    }
    causes.join(": ")
}

#[cfg(test)]
mod tests {
    use super::testing::LogCapture;
    use super::*;

    #[test]
    fn event_carries_all_fields() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        emit(StoreOperation::Append, Some("store:inputs"), StoreOutcome::Ok, Duration::from_nanos(1234));

        capture.assert_contains(STORE_OPERATION);
        capture.assert_contains(STORE_KEY);
        capture.assert_contains(STORE_OUTCOME);
        capture.assert_contains(DURATION_NS);
        capture.assert_contains("append_to_list");
        capture.assert_contains("store:inputs");
        capture.assert_contains("1234");
    }

    #[test]
    fn cause_chain_is_a_single_line() {
        let err = Error::fetch(Error::store_unavailable("connection reset"));
        let chain = cause_chain(&err);

        assert!(!chain.contains('\n'), "got: {chain:?}");
        assert!(chain.ends_with("connection reset"), "got: {chain:?}");
        assert_eq!(cause_chain(&Error::fetch("reset")), "reset");
    }

    #[test]
    fn level_follows_outcome() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        emit(StoreOperation::Get, None, StoreOutcome::Ok, Duration::ZERO);
        capture.assert_contains("DEBUG");

        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        emit(StoreOperation::Get, None, StoreOutcome::Timeout, Duration::ZERO);
        capture.assert_contains("WARN");
        capture.assert_contains("timeout");

        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        emit(StoreOperation::FlushAll, None, StoreOutcome::Error, Duration::ZERO);
        capture.assert_contains("ERROR");
    }
}
