// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Values accepted by [`InstrumentedCache::store`](crate::InstrumentedCache::store).

use std::fmt::Write;

/// A value that can be stored in an [`InstrumentedCache`](crate::InstrumentedCache).
///
/// Each kind has a canonical byte encoding, produced by [`Payload::to_bytes`], that
/// reads back through the matching `get_as_*` accessor:
///
/// | Kind      | Encoding                    | Read back with   |
/// |-----------|-----------------------------|------------------|
/// | `Text`    | UTF-8                       | `get_as_string`  |
/// | `Bytes`   | the bytes themselves        | `get`            |
/// | `Integer` | decimal text                | `get_as_integer` |
/// | `Float`   | shortest round-trip text    | `get_as_float`   |
///
/// # Examples
///
/// ```
/// use tally::Payload;
///
/// assert_eq!(Payload::from(5).to_bytes(), b"5");
/// assert_eq!(Payload::from(1.0).to_bytes(), b"1.0");
/// assert_eq!(Payload::from("a").literal(), "'a'");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A signed integer.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
}

impl Payload {
    /// Returns the canonical stored encoding of this value.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.as_bytes().to_vec(),
            Self::Bytes(bytes) => bytes.clone(),
            Self::Integer(value) => value.to_string().into_bytes(),
            Self::Float(value) => format_float(*value).into_bytes(),
        }
    }

    /// Returns the value written as a quoted literal, as it appears in call history.
    ///
    /// Text is single-quoted unless it contains a single quote and no double quote,
    /// bytes are written as `b'...'` with non-printable bytes hex-escaped, and numbers
    /// are written as-is.
    #[must_use]
    pub fn literal(&self) -> String {
        match self {
            Self::Text(text) => quote_text(text),
            Self::Bytes(bytes) => quote_bytes(bytes),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => format_float(*value),
        }
    }
}

/// Shortest text that parses back to the same float, always carrying a decimal point
/// or exponent so it never reads back as an integer.
///
/// Exponents carry a sign and at least two digits (`1e+16`, `1e-05`) and the special
/// values are `nan`, `inf` and `-inf`.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-inf" } else { "inf" }.to_owned();
    }

    // `Debug` switches to exponent form at the same magnitudes, but writes `1e16`.
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

fn quote_text(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn quote_bytes(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') { '"' } else { '\'' };
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote);
    for &byte in bytes {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            byte if char::from(byte) == quote => {
                out.push('\\');
                out.push(quote);
            }
            0x20..=0x7e => out.push(char::from(byte)),
            byte => {
                // Writing to a String cannot fail.
                let _ = write!(out, "\\x{byte:02x}");
            }
        }
    }
    out.push(quote);
    out
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Payload {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(value: &[u8; N]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Payload {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Payload {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for Payload {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}
