// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use uuid::Uuid;

/// A randomly generated key under which [`InstrumentedCache::store`](crate::InstrumentedCache::store)
/// places a value.
///
/// Keys are UUID v4 strings, so two stores never collide in practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// Generates a fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}
