// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, SystemTime};

/// A stored payload with an optional expiry.
///
/// Stores that evaluate TTL themselves keep their values as `Entry` and ask
/// [`Entry::is_expired`] on every read, so an expired entry behaves as absent even
/// before it is physically removed.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use tally_store::Entry;
///
/// let now = SystemTime::UNIX_EPOCH;
/// let entry = Entry::with_ttl(b"page".to_vec(), Duration::from_secs(10), now);
///
/// assert!(!entry.is_expired(now + Duration::from_secs(9)));
/// assert!(entry.is_expired(now + Duration::from_secs(10)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    payload: Vec<u8>,
    expires_at: Option<SystemTime>,
}

impl Entry {
    /// Creates an entry that never expires.
    #[must_use]
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            expires_at: None,
        }
    }

    /// Creates an entry that expires `ttl` after `now`.
    ///
    /// A TTL so large that the deadline cannot be represented produces an entry that
    /// never expires.
    #[must_use]
    pub fn with_ttl(payload: Vec<u8>, ttl: Duration, now: SystemTime) -> Self {
        Self {
            payload,
            expires_at: now.checked_add(ttl),
        }
    }

    /// Creates an entry with an explicit deadline, e.g. one carried over from a previous value.
    #[must_use]
    pub fn with_expires_at(payload: Vec<u8>, expires_at: Option<SystemTime>) -> Self {
        Self { payload, expires_at }
    }

    /// Returns the point in time at which this entry expires, if any.
    #[must_use]
    pub fn expires_at(&self) -> Option<SystemTime> {
        self.expires_at
    }

    /// Returns `true` once `now` has reached the entry's deadline.
    #[must_use]
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    /// Returns the stored bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the entry and returns the stored bytes.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}
