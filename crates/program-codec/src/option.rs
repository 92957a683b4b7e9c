//! Optional values.
//!
//! `Option<T>` is a 1-byte presence flag followed by the payload only when
//! present. [`COption`] is the fixed-width variant used by SPL-style
//! accounts: a u32 tag followed by a payload slot that is always written.

use serde::{Deserialize, Serialize};

use crate::codec::{prefixed_fixed, Codec};
use crate::cursor::{fill_bytes, read_bytes};
use crate::error::{CodecError, Result};
use crate::prim::decode_flag;

impl<T: Codec> Codec for Option<T> {
    const FIXED_SIZE: Option<usize> = None;

    fn size(&self) -> usize {
        1 + self.as_ref().map_or(0, Codec::size)
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        match self {
            Some(value) => {
                let offset = 1u8.encode(buf, offset)?;
                value.encode(buf, offset)
            }
            None => 0u8.encode(buf, offset),
        }
    }

    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (present, offset) = decode_flag(buf, offset, "option")?;
        if !present {
            return Ok((None, offset));
        }
        let (value, offset) = T::decode(buf, offset)?;
        Ok((Some(value), offset))
    }
}

/// A fixed-width optional value: u32 LE tag (0 or 1) and a payload slot
/// that is zero-filled when absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct COption<T>(pub Option<T>);

impl<T: Codec> COption<T> {
    /// Payload slot width. Referencing this with a variable-width `T`
    /// fails to compile.
    const SLOT: usize = match T::FIXED_SIZE {
        Some(n) => n,
        None => panic!("COption payload must have a fixed size"),
    };

    pub fn some(value: T) -> Self {
        Self(Some(value))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl<T> From<Option<T>> for COption<T> {
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

impl<T> From<COption<T>> for Option<T> {
    fn from(value: COption<T>) -> Self {
        value.0
    }
}

impl<T: Codec> Codec for COption<T> {
    const FIXED_SIZE: Option<usize> = prefixed_fixed(4, T::FIXED_SIZE);

    fn size(&self) -> usize {
        4 + Self::SLOT
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        match &self.0 {
            Some(value) => {
                let offset = 1u32.encode(buf, offset)?;
                value.encode(buf, offset)
            }
            None => {
                let offset = 0u32.encode(buf, offset)?;
                fill_bytes(buf, offset, Self::SLOT, 0)
            }
        }
    }

    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (tag, body) = u32::decode(buf, offset)?;
        match tag {
            0 => {
                // The slot still has to be there.
                let (_, next) = read_bytes(buf, body, Self::SLOT)?;
                Ok((Self(None), next))
            }
            1 => {
                let (value, next) = T::decode(buf, body)?;
                Ok((Self(Some(value)), next))
            }
            other => Err(CodecError::InvalidEncoding(format!(
                "coption tag {other} at offset {offset}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubkey::Pubkey;

    // -- Option -------------------------------------------------------------

    #[test]
    fn none_is_one_byte() {
        let value: Option<u64> = None;
        assert_eq!(value.size(), 1);
        assert_eq!(value.to_bytes().unwrap(), vec![0]);
        assert_eq!(Option::<u64>::from_bytes_exact(&[0]).unwrap(), None);
    }

    #[test]
    fn some_is_flag_plus_payload() {
        let value = Some(0x0102u16);
        assert_eq!(value.size(), 1 + 2);
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes, vec![1, 2, 1]);
        assert_eq!(Option::<u16>::from_bytes_exact(&bytes).unwrap(), value);
    }

    #[test]
    fn option_pubkey_roundtrip() {
        let value = Some(Pubkey::new_from_array([3; 32]));
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes.len(), 33);
        assert_eq!(Option::<Pubkey>::from_bytes_exact(&bytes).unwrap(), value);
    }

    #[test]
    fn option_flag_other_than_one_is_rejected() {
        let err = Option::<u8>::from_bytes(&[2, 7]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidEncoding(_)));
    }

    #[test]
    fn some_with_missing_payload_fails() {
        let err = Option::<u32>::from_bytes(&[1, 0]).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEndOfBuffer { .. }));
    }

    #[test]
    fn nested_option() {
        let value: Option<Option<u8>> = Some(None);
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes, vec![1, 0]);
        assert_eq!(Option::<Option<u8>>::from_bytes_exact(&bytes).unwrap(), value);
    }

    // -- COption ------------------------------------------------------------

    #[test]
    fn coption_none_keeps_slot() {
        let value = COption::<Pubkey>::none();
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
        assert!(bytes[4..].iter().all(|b| *b == 0));
        assert_eq!(COption::<Pubkey>::FIXED_SIZE, Some(36));
    }

    #[test]
    fn coption_some_roundtrip() {
        let value = COption::some(42u64);
        let bytes = value.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[1, 0, 0, 0]);
        assert_eq!(COption::<u64>::from_bytes_exact(&bytes).unwrap(), value);
    }

    #[test]
    fn coption_rejects_bad_tag() {
        let bytes = [2, 0, 0, 0, 0, 0, 0, 0];
        assert!(COption::<u32>::from_bytes(&bytes).is_err());
    }

    #[test]
    fn coption_none_requires_slot_bytes() {
        let err = COption::<u64>::from_bytes(&[0, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEndOfBuffer { .. }));
    }
}
