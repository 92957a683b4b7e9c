//! Sequence combinators.
//!
//! | type            | layout                                      |
//! |-----------------|---------------------------------------------|
//! | `Vec<T>`        | u32 LE count, then each element              |
//! | `[T; N]`        | N elements, no prefix                        |
//! | `FixedVec<T,N>` | N elements, no prefix, length checked        |
//! | `(A, B, ..)`    | each member in order, no prefix              |
//! | `BTreeMap<K,V>` | u32 LE count, then key/value pairs by key    |

use std::collections::BTreeMap;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::codec::{repeat_fixed, Codec};
use crate::error::{CodecError, Result};
use crate::prim::{decode_len, encode_len};

fn encode_elements<T: Codec>(items: &[T], buf: &mut [u8], mut offset: usize) -> Result<usize> {
    for item in items {
        offset = item.encode(buf, offset)?;
    }
    Ok(offset)
}

fn decode_elements<T: Codec>(buf: &[u8], mut offset: usize, count: usize) -> Result<(Vec<T>, usize)> {
    // A corrupt count must not drive a huge allocation; cap by what the
    // buffer could possibly hold.
    let min_width = T::FIXED_SIZE.unwrap_or(1).max(1);
    let plausible = buf.len().saturating_sub(offset) / min_width;
    let mut items = Vec::with_capacity(count.min(plausible));
    for _ in 0..count {
        let (item, next) = T::decode(buf, offset)?;
        items.push(item);
        offset = next;
    }
    Ok((items, offset))
}

impl<T: Codec> Codec for Vec<T> {
    const FIXED_SIZE: Option<usize> = None;

    fn size(&self) -> usize {
        4 + self.iter().map(Codec::size).sum::<usize>()
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        let offset = encode_len(self.len(), buf, offset)?;
        encode_elements(self, buf, offset)
    }

    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (count, offset) = decode_len(buf, offset)?;
        if count > 0 && T::FIXED_SIZE == Some(0) {
            return Err(CodecError::InvalidEncoding(format!(
                "vec of {count} zero-width elements at offset {offset}"
            )));
        }
        decode_elements(buf, offset, count)
    }
}

impl<T: Codec, const N: usize> Codec for [T; N] {
    const FIXED_SIZE: Option<usize> = repeat_fixed(T::FIXED_SIZE, N);

    fn size(&self) -> usize {
        self.iter().map(Codec::size).sum()
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        encode_elements(self, buf, offset)
    }

    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (items, next) = decode_elements::<T>(buf, offset, N)?;
        let arr: [T; N] = items.try_into().map_err(|v: Vec<T>| {
            CodecError::InvalidEncoding(format!("expected {N} array elements, got {}", v.len()))
        })?;
        Ok((arr, next))
    }
}

/// A vector that must hold exactly `N` elements and is stored without a
/// length prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedVec<T, const N: usize>(Vec<T>);

impl<T, const N: usize> FixedVec<T, N> {
    pub fn new(items: Vec<T>) -> Result<Self> {
        if items.len() != N {
            return Err(CodecError::Overflow {
                capacity: N,
                actual: items.len(),
            });
        }
        Ok(Self(items))
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T, const N: usize> Deref for FixedVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T: Codec, const N: usize> Codec for FixedVec<T, N> {
    const FIXED_SIZE: Option<usize> = repeat_fixed(T::FIXED_SIZE, N);

    fn size(&self) -> usize {
        self.0.iter().map(Codec::size).sum()
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        // Deserialized values bypass `new`, so check again here.
        if self.0.len() != N {
            return Err(CodecError::Overflow {
                capacity: N,
                actual: self.0.len(),
            });
        }
        encode_elements(&self.0, buf, offset)
    }

    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (items, next) = decode_elements(buf, offset, N)?;
        Ok((Self(items), next))
    }
}

impl<K: Codec + Ord, V: Codec> Codec for BTreeMap<K, V> {
    const FIXED_SIZE: Option<usize> = None;

    fn size(&self) -> usize {
        4 + self.iter().map(|(k, v)| k.size() + v.size()).sum::<usize>()
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        let mut offset = encode_len(self.len(), buf, offset)?;
        for (key, value) in self {
            offset = key.encode(buf, offset)?;
            offset = value.encode(buf, offset)?;
        }
        Ok(offset)
    }

    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (count, mut offset) = decode_len(buf, offset)?;
        let mut map = BTreeMap::new();
        for _ in 0..count {
            let (key, next) = K::decode(buf, offset)?;
            let (value, next) = V::decode(buf, next)?;
            if map.insert(key, value).is_some() {
                return Err(CodecError::InvalidEncoding(format!(
                    "duplicate map key ending at offset {next}"
                )));
            }
            offset = next;
        }
        Ok((map, offset))
    }
}

macro_rules! impl_tuple_codec {
    ( $( $name:ident $var:ident ),+ ) => {
        impl<$( $name: Codec ),+> Codec for ( $( $name, )+ ) {
            const FIXED_SIZE: Option<usize> = crate::codec::sum_fixed(&[ $( $name::FIXED_SIZE ),+ ]);

            fn size(&self) -> usize {
                let ( $( $var, )+ ) = self;
                0 $( + $var.size() )+
            }

            fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
                let ( $( $var, )+ ) = self;
                $( let offset = $var.encode(buf, offset)?; )+
                Ok(offset)
            }

            fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
                $( let ($var, offset) = <$name as Codec>::decode(buf, offset)?; )+
                Ok((( $( $var, )+ ), offset))
            }
        }
    };
}

impl_tuple_codec!(A a);
impl_tuple_codec!(A a, B b);
impl_tuple_codec!(A a, B b, C c);
impl_tuple_codec!(A a, B b, C c, D d);
impl_tuple_codec!(A a, B b, C c, D d, E e);
impl_tuple_codec!(A a, B b, C c, D d, E e, F f);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubkey::Pubkey;

    // -- Vec ----------------------------------------------------------------

    #[test]
    fn vec_layout() {
        let bytes = vec![1u16, 2, 3].to_bytes().unwrap();
        assert_eq!(bytes, vec![3, 0, 0, 0, 1, 0, 2, 0, 3, 0]);
        assert_eq!(bytes.len(), 4 + 2 * 3);
    }

    #[test]
    fn empty_vec_is_just_prefix() {
        let bytes = Vec::<u64>::new().to_bytes().unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
    }

    #[test]
    fn vec_of_strings_roundtrip() {
        let value = vec!["a".to_string(), String::new(), "xyz".to_string()];
        let bytes = value.to_bytes().unwrap();
        assert_eq!(Vec::<String>::from_bytes_exact(&bytes).unwrap(), value);
    }

    #[test]
    fn vec_count_beyond_buffer_fails() {
        // Claims a billion u64s with only two bytes of payload.
        let bytes = [0x00, 0xca, 0x9a, 0x3b, 1, 2];
        let err = Vec::<u64>::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEndOfBuffer { .. }));
    }

    // -- Arrays -------------------------------------------------------------

    #[test]
    fn vec_of_zero_width_elements_rejects_count() {
        let err = Vec::<[u8; 0]>::from_bytes(&[0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidEncoding(_)));

        let (empty, next) = Vec::<[u8; 0]>::from_bytes(&[0, 0, 0, 0]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(next, 4);
    }

    #[test]
    fn array_has_no_prefix() {
        let bytes = [1u32, 2].to_bytes().unwrap();
        assert_eq!(bytes, vec![1, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(<[u32; 2]>::FIXED_SIZE, Some(8));
    }

    #[test]
    fn byte_array_roundtrip() {
        let value = [0xabu8; 8];
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes, value.to_vec());
        assert_eq!(<[u8; 8]>::from_bytes_exact(&bytes).unwrap(), value);
    }

    #[test]
    fn byte_array_short_source() {
        assert!(<[u8; 8]>::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn array_of_variable_elements_is_variable() {
        assert_eq!(<[String; 2]>::FIXED_SIZE, None);
    }

    // -- FixedVec -----------------------------------------------------------

    #[test]
    fn fixed_vec_requires_exact_length() {
        assert!(FixedVec::<u8, 3>::new(vec![1, 2]).is_err());
        let value = FixedVec::<u8, 3>::new(vec![1, 2, 3]).unwrap();
        assert_eq!(value.to_bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn fixed_vec_roundtrip() {
        let keys = vec![Pubkey::new_from_array([1; 32]), Pubkey::new_from_array([2; 32])];
        let value = FixedVec::<Pubkey, 2>::new(keys).unwrap();
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes.len(), 64);
        assert_eq!(FixedVec::<Pubkey, 2>::from_bytes_exact(&bytes).unwrap(), value);
    }

    // -- Tuples -------------------------------------------------------------

    #[test]
    fn tuple_concatenates_members() {
        let value = (1u8, true, 0x0102u16);
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes, vec![1, 1, 2, 1]);
        assert_eq!(<(u8, bool, u16)>::FIXED_SIZE, Some(4));
        assert_eq!(<(u8, bool, u16)>::from_bytes_exact(&bytes).unwrap(), value);
    }

    #[test]
    fn tuple_with_string_is_variable() {
        assert_eq!(<(u8, String)>::FIXED_SIZE, None);
        let value = (9u8, "ok".to_string());
        assert_eq!(value.size(), 1 + 4 + 2);
    }

    // -- Maps ---------------------------------------------------------------

    #[test]
    fn map_is_written_in_key_order() {
        let mut map = BTreeMap::new();
        map.insert(2u8, 20u8);
        map.insert(1u8, 10u8);
        let bytes = map.to_bytes().unwrap();
        assert_eq!(bytes, vec![2, 0, 0, 0, 1, 10, 2, 20]);
        assert_eq!(BTreeMap::<u8, u8>::from_bytes_exact(&bytes).unwrap(), map);
    }

    #[test]
    fn map_rejects_duplicate_keys() {
        let bytes = [2, 0, 0, 0, 1, 10, 1, 11];
        let err = BTreeMap::<u8, u8>::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::InvalidEncoding(_)));
    }
}
