//! Bounds-checked access to flat byte buffers.
//!
//! Every codec goes through these two helpers, so a short buffer always
//! surfaces as [`CodecError::UnexpectedEndOfBuffer`] and never as a slice
//! panic. Offsets are plain values: callers pass the current offset in and
//! get the advanced offset back.

use crate::error::{CodecError, Result};

/// Borrow `len` bytes of `buf` starting at `offset`.
///
/// Returns the slice and the offset just past it.
pub fn read_bytes(buf: &[u8], offset: usize, len: usize) -> Result<(&[u8], usize)> {
    let end = offset
        .checked_add(len)
        .filter(|end| *end <= buf.len())
        .ok_or(CodecError::UnexpectedEndOfBuffer {
            offset,
            needed: len,
            available: buf.len().saturating_sub(offset),
        })?;
    Ok((&buf[offset..end], end))
}

/// Read exactly `N` bytes into an array.
pub fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<([u8; N], usize)> {
    let (bytes, next) = read_bytes(buf, offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok((out, next))
}

/// Copy `src` into `buf` at `offset`.
///
/// Returns the offset just past the written bytes.
pub fn write_bytes(buf: &mut [u8], offset: usize, src: &[u8]) -> Result<usize> {
    let available = buf.len().saturating_sub(offset);
    let end = offset
        .checked_add(src.len())
        .filter(|end| *end <= buf.len())
        .ok_or(CodecError::UnexpectedEndOfBuffer {
            offset,
            needed: src.len(),
            available,
        })?;
    buf[offset..end].copy_from_slice(src);
    Ok(end)
}

/// Fill `len` bytes of `buf` at `offset` with `byte`.
pub fn fill_bytes(buf: &mut [u8], offset: usize, len: usize, byte: u8) -> Result<usize> {
    let available = buf.len().saturating_sub(offset);
    let end = offset
        .checked_add(len)
        .filter(|end| *end <= buf.len())
        .ok_or(CodecError::UnexpectedEndOfBuffer {
            offset,
            needed: len,
            available,
        })?;
    buf[offset..end].fill(byte);
    Ok(end)
}
