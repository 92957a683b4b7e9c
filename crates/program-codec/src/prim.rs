//! Leaf codecs: little-endian integers and booleans.

use crate::codec::Codec;
use crate::cursor::{read_array, write_bytes};
use crate::error::{CodecError, Result};

macro_rules! impl_int_codec {
    ( $( $int:ty ),* ) => {
        $(
            impl Codec for $int {
                const FIXED_SIZE: Option<usize> = Some(std::mem::size_of::<$int>());

                fn size(&self) -> usize {
                    std::mem::size_of::<$int>()
                }

                fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
                    write_bytes(buf, offset, &self.to_le_bytes())
                }

                fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
                    let (bytes, next) = read_array::<{ std::mem::size_of::<$int>() }>(buf, offset)?;
                    Ok((<$int>::from_le_bytes(bytes), next))
                }
            }
        )*
    };
}

impl_int_codec!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

/// Booleans are one byte; anything other than 0 or 1 is rejected on decode.
impl Codec for bool {
    const FIXED_SIZE: Option<usize> = Some(1);

    fn size(&self) -> usize {
        1
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        write_bytes(buf, offset, &[u8::from(*self)])
    }

    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let ([byte], next) = read_array::<1>(buf, offset)?;
        match byte {
            0 => Ok((false, next)),
            1 => Ok((true, next)),
            other => Err(CodecError::InvalidEncoding(format!(
                "boolean byte {other:#04x} at offset {offset}"
            ))),
        }
    }
}

/// Decode a presence/selector flag that must be exactly 0 or 1.
pub(crate) fn decode_flag(buf: &[u8], offset: usize, what: &str) -> Result<(bool, usize)> {
    let ([byte], next) = read_array::<1>(buf, offset)?;
    match byte {
        0 => Ok((false, next)),
        1 => Ok((true, next)),
        other => Err(CodecError::InvalidEncoding(format!(
            "{what} flag {other:#04x} at offset {offset}"
        ))),
    }
}

/// Encode a collection length as the u32 little-endian prefix.
pub(crate) fn encode_len(len: usize, buf: &mut [u8], offset: usize) -> Result<usize> {
    let len = u32::try_from(len).map_err(|_| CodecError::Overflow {
        capacity: u32::MAX as usize,
        actual: len,
    })?;
    len.encode(buf, offset)
}

/// Decode a u32 little-endian length prefix.
pub(crate) fn decode_len(buf: &[u8], offset: usize) -> Result<(usize, usize)> {
    let (len, next) = u32::decode(buf, offset)?;
    Ok((len as usize, next))
}
