// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Decoders for stored bytes.
//!
//! Each function fits [`InstrumentedCache::get_with`](crate::InstrumentedCache::get_with)
//! and fails with [`ErrorKind::Decode`](crate::ErrorKind::Decode) when the bytes are
//! not of the requested type.

use tally_store::Error;

/// Decodes UTF-8 text.
///
/// # Errors
///
/// Fails if the bytes are not valid UTF-8.
pub fn utf8(bytes: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(bytes).map_err(Error::decode)
}

/// Decodes a decimal integer literal.
///
/// # Errors
///
/// Fails if the bytes are not UTF-8 or not an integer literal.
pub fn integer(bytes: Vec<u8>) -> Result<i64, Error> {
    let text = utf8(bytes)?;
    text.trim()
        .parse()
        .map_err(|e| Error::decode(format!("'{text}' is not an integer: {e}")))
}

/// Decodes a floating-point literal.
///
/// # Errors
///
/// Fails if the bytes are not UTF-8 or not a float literal.
pub fn float(bytes: Vec<u8>) -> Result<f64, Error> {
    let text = utf8(bytes)?;
    text.trim()
        .parse()
        .map_err(|e| Error::decode(format!("'{text}' is not a float: {e}")))
}
