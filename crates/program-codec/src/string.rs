//! UTF-8 string codecs.
//!
//! `String` is length-prefixed (u32 LE byte count). [`FixedString`] occupies
//! a declared number of bytes, padded with `0x00`.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::codec::Codec;
use crate::cursor::{fill_bytes, read_bytes, write_bytes};
use crate::error::{CodecError, Result};
use crate::prim::{decode_len, encode_len};

/// Padding byte used for fixed-capacity strings.
pub const STRING_PADDING: u8 = 0;

fn utf8(bytes: &[u8], offset: usize) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| CodecError::InvalidEncoding(format!("utf-8 string at offset {offset}: {e}")))
}

impl Codec for String {
    const FIXED_SIZE: Option<usize> = None;

    fn size(&self) -> usize {
        4 + self.len()
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        let offset = encode_len(self.len(), buf, offset)?;
        write_bytes(buf, offset, self.as_bytes())
    }

    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (len, body) = decode_len(buf, offset)?;
        let (bytes, next) = read_bytes(buf, body, len)?;
        Ok((utf8(bytes, body)?, next))
    }
}

/// A string stored in exactly `N` bytes.
///
/// Content longer than `N` bytes fails to encode rather than being cut.
/// Trailing padding is stripped on decode.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FixedString<const N: usize>(String);

impl<const N: usize> FixedString<N> {
    /// Wrap `value`, checking it fits in `N` bytes.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        check_fixed_str(&value, N)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub const fn capacity() -> usize {
        N
    }
}

impl<const N: usize> TryFrom<String> for FixedString<N> {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl<const N: usize> From<FixedString<N>> for String {
    fn from(value: FixedString<N>) -> Self {
        value.0
    }
}

impl<const N: usize> Deref for FixedString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<const N: usize> fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const N: usize> Codec for FixedString<N> {
    const FIXED_SIZE: Option<usize> = Some(N);

    fn size(&self) -> usize {
        N
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        encode_fixed_str(&self.0, N, buf, offset)
    }

    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (value, next) = decode_fixed_str(buf, offset, N)?;
        Ok((Self(value), next))
    }
}

/// Content must fit the slot and must not end in the padding byte, which
/// decode would strip.
fn check_fixed_str(value: &str, capacity: usize) -> Result<()> {
    let bytes = value.as_bytes();
    if bytes.len() > capacity {
        return Err(CodecError::Overflow {
            capacity,
            actual: bytes.len(),
        });
    }
    if bytes.last() == Some(&STRING_PADDING) {
        return Err(CodecError::InvalidEncoding(
            "fixed string ends in padding byte 0x00".into(),
        ));
    }
    Ok(())
}

/// Write `value` into a `capacity`-byte slot, padding the tail.
pub(crate) fn encode_fixed_str(
    value: &str,
    capacity: usize,
    buf: &mut [u8],
    offset: usize,
) -> Result<usize> {
    check_fixed_str(value, capacity)?;
    let bytes = value.as_bytes();
    let offset = write_bytes(buf, offset, bytes)?;
    fill_bytes(buf, offset, capacity - bytes.len(), STRING_PADDING)
}

/// Read a `capacity`-byte slot and strip trailing padding.
pub(crate) fn decode_fixed_str(buf: &[u8], offset: usize, capacity: usize) -> Result<(String, usize)> {
    let (bytes, next) = read_bytes(buf, offset, capacity)?;
    let end = bytes
        .iter()
        .rposition(|b| *b != STRING_PADDING)
        .map_or(0, |i| i + 1);
    Ok((utf8(&bytes[..end], offset)?, next))
}
