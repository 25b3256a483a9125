// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for store, decode and fetch operations.

use std::fmt;

use recoverable::{Recovery, RecoveryInfo};

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The backing store could not be reached or did not answer in time.
    StoreUnavailable,
    /// Stored bytes could not be converted to the requested type.
    Decode,
    /// An external fetch failed.
    Fetch,
}

impl ErrorKind {
    /// Returns a stable, lowercase name for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StoreUnavailable => "store unavailable",
            Self::Decode => "decode error",
            Self::Fetch => "fetch error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error from a tally operation.
///
/// Every error carries an [`ErrorKind`] and, usually, the underlying cause. Use
/// [`Error::kind`] to branch on the category and [`std::error::Error::source()`]
/// to inspect the cause.
///
/// # Example
///
/// ```
/// use tally_store::{Error, ErrorKind};
///
/// let error = Error::store_unavailable("connection refused");
/// assert_eq!(error.kind(), ErrorKind::StoreUnavailable);
/// ```
#[ohno::error]
#[display("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Creates a [`ErrorKind::StoreUnavailable`] error.
    pub fn store_unavailable(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::StoreUnavailable, cause)
    }

    /// Creates a [`ErrorKind::Decode`] error.
    pub fn decode(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::Decode, cause)
    }

    /// Creates a [`ErrorKind::Fetch`] error.
    pub fn fetch(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::Fetch, cause)
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` if this is a [`ErrorKind::StoreUnavailable`] error.
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        self.kind == ErrorKind::StoreUnavailable
    }
}

impl Recovery for Error {
    fn recovery(&self) -> RecoveryInfo {
        match self.kind {
            ErrorKind::StoreUnavailable => RecoveryInfo::unavailable(),
            ErrorKind::Fetch => RecoveryInfo::retry(),
            ErrorKind::Decode => RecoveryInfo::never(),
        }
    }
}

/// A specialized [`Result`] type for tally operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use recoverable::RecoveryKind;

    use super::*;

    #[test]
    fn kind_is_preserved_by_constructors() {
        assert_eq!(Error::store_unavailable("down").kind(), ErrorKind::StoreUnavailable);
        assert_eq!(Error::decode("bad utf-8").kind(), ErrorKind::Decode);
        assert_eq!(Error::fetch("reset").kind(), ErrorKind::Fetch);
    }

    #[test]
    fn display_contains_kind_and_cause() {
        let display_str = Error::decode("not an integer").to_string();
        assert!(display_str.contains("decode error"), "got: {display_str}");
        assert!(display_str.contains("not an integer"), "got: {display_str}");
    }

    #[test]
    fn debug_contains_cause_message() {
        let debug_str = format!("{:?}", Error::store_unavailable("connection refused"));
        assert!(
            debug_str.contains("connection refused"),
            "debug output should contain the cause message, got: {debug_str}"
        );
    }

    #[test]
    fn recovery_follows_kind() {
        assert_eq!(Error::store_unavailable("x").recovery().kind(), RecoveryKind::Unavailable);
        assert_eq!(Error::fetch("x").recovery().kind(), RecoveryKind::Retry);
        assert_eq!(Error::decode("x").recovery().kind(), RecoveryKind::Never);
    }

    #[test]
    fn is_store_unavailable_only_for_that_kind() {
        assert!(Error::store_unavailable("x").is_store_unavailable());
        assert!(!Error::fetch("x").is_store_unavailable());
    }

    #[test]
    fn result_type_alias_propagates_errors() {
        fn returns_err() -> Result<i32> {
            Err(Error::fetch("expected failure"))
        }

        let err = returns_err().expect_err("should return an error");
        assert!(format!("{err}").contains("expected failure"));
    }
}
