//! The shared codec contract.
//!
//! A single trait covers both fixed-width and value-dependent layouts:
//! `FIXED_SIZE` is known up front when the width never depends on the value,
//! and `size()` always reports the exact number of bytes `encode` will write.

use crate::error::{CodecError, Result};

/// A type with a fixed on-chain binary layout.
pub trait Codec: Sized {
    /// Width in bytes when every value of the type encodes to the same size.
    const FIXED_SIZE: Option<usize>;

    /// Exact number of bytes `encode` writes for this value.
    fn size(&self) -> usize;

    /// Write the value into `buf` at `offset`, returning the offset just past it.
    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize>;

    /// Read a value from `buf` at `offset`, returning it with the offset just past it.
    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)>;

    /// Allocate exactly `size()` bytes and encode into them.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.size()];
        self.encode(&mut buf, 0)?;
        Ok(buf)
    }

    /// Decode from the start of `buf`, returning the value and bytes consumed.
    ///
    /// Trailing bytes are left alone; account data is frequently larger than
    /// the record it holds.
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize)> {
        Self::decode(buf, 0)
    }

    /// Decode from the start of `buf` and require the whole buffer be consumed.
    fn from_bytes_exact(buf: &[u8]) -> Result<Self> {
        let (value, consumed) = Self::decode(buf, 0)?;
        if consumed != buf.len() {
            return Err(CodecError::TrailingBytes {
                consumed,
                total: buf.len(),
            });
        }
        Ok(value)
    }
}

/// Sum of fixed widths, or `None` if any part is variable.
pub const fn sum_fixed(parts: &[Option<usize>]) -> Option<usize> {
    let mut total = 0usize;
    let mut i = 0;
    while i < parts.len() {
        match parts[i] {
            Some(n) => total += n,
            None => return None,
        }
        i += 1;
    }
    Some(total)
}

/// The shared width when every part has the same fixed width.
///
/// An empty list has no common width.
pub const fn uniform_fixed(parts: &[Option<usize>]) -> Option<usize> {
    if parts.is_empty() {
        return None;
    }
    let first = match parts[0] {
        Some(n) => n,
        None => return None,
    };
    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            Some(n) if n == first => {}
            _ => return None,
        }
        i += 1;
    }
    Some(first)
}

/// `count` repetitions of a fixed width.
pub const fn repeat_fixed(width: Option<usize>, count: usize) -> Option<usize> {
    match width {
        Some(n) => Some(n * count),
        None => None,
    }
}

/// Add a constant prefix to a fixed width.
pub const fn prefixed_fixed(prefix: usize, width: Option<usize>) -> Option<usize> {
    match width {
        Some(n) => Some(prefix + n),
        None => None,
    }
}
