//! Struct codecs.
//!
//! [`codec_struct!`](crate::codec_struct) declares a plain struct together
//! with its [`Codec`](crate::Codec) impl. Fields are written in declaration
//! order with no padding between them, and read back in the same order.
//!
//! ```
//! use program_codec::{codec_struct, Codec, Pubkey};
//!
//! codec_struct! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Deposit {
//!         pub bump: u8,
//!         pub amount: u64,
//!         pub authority: Option<Pubkey>,
//!     }
//! }
//!
//! let deposit = Deposit { bump: 7, amount: 1_000_000, authority: None };
//! let bytes = deposit.to_bytes().unwrap();
//! assert_eq!(bytes.len(), 10);
//! assert_eq!(Deposit::from_bytes(&bytes).unwrap(), (deposit, 10));
//! ```

#[macro_export]
macro_rules! codec_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::Codec for $name {
            const FIXED_SIZE: ::core::option::Option<usize> =
                $crate::codec::sum_fixed(&[ $( <$fty as $crate::Codec>::FIXED_SIZE ),* ]);

            fn size(&self) -> usize {
                0 $( + $crate::Codec::size(&self.$field) )*
            }

            #[allow(unused_variables)]
            fn encode(&self, buf: &mut [u8], offset: usize) -> $crate::Result<usize> {
                $( let offset = $crate::Codec::encode(&self.$field, buf, offset)?; )*
                ::core::result::Result::Ok(offset)
            }

            #[allow(unused_variables)]
            fn decode(buf: &[u8], offset: usize) -> $crate::Result<(Self, usize)> {
                $( let ($field, offset) = <$fty as $crate::Codec>::decode(buf, offset)?; )*
                ::core::result::Result::Ok((Self { $( $field ),* }, offset))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Codec, CodecError, FixedString, Pubkey};

    codec_struct! {
        #[derive(Debug, Clone, PartialEq)]
        struct Sample {
            a: u8,
            b: u64,
            c: Option<Pubkey>,
        }
    }

    codec_struct! {
        #[derive(Debug, Clone, PartialEq)]
        struct Fixed {
            /// Owner of the slot.
            owner: Pubkey,
            label: FixedString<10>,
            flags: [bool; 2],
        }
    }

    codec_struct! {
        #[derive(Debug, Default, PartialEq)]
        struct Empty {}
    }

    codec_struct! {
        #[derive(Debug, Clone, PartialEq)]
        struct Nested {
            inner: Fixed,
            names: Vec<String>,
        }
    }

    fn fixed() -> Fixed {
        Fixed {
            owner: Pubkey::new_from_array([9; 32]),
            label: FixedString::new("hi").unwrap(),
            flags: [true, false],
        }
    }

    #[test]
    fn sample_layout() {
        let value = Sample {
            a: 7,
            b: 1_000_000,
            c: None,
        };
        let bytes = value.to_bytes().unwrap();

        let mut expected = vec![7u8];
        expected.extend_from_slice(&1_000_000u64.to_le_bytes());
        expected.push(0);
        assert_eq!(bytes, expected);
        assert_eq!(bytes.len(), 10);

        let (back, offset) = Sample::from_bytes(&bytes).unwrap();
        assert_eq!(back, value);
        assert_eq!(offset, 10);
    }

    #[test]
    fn sample_with_key_is_variable() {
        assert_eq!(Sample::FIXED_SIZE, None);
        let value = Sample {
            a: 1,
            b: 2,
            c: Some(Pubkey::new_from_array([1; 32])),
        };
        assert_eq!(value.size(), 1 + 8 + 33);
        let bytes = value.to_bytes().unwrap();
        assert_eq!(Sample::from_bytes_exact(&bytes).unwrap(), value);
    }

    #[test]
    fn fixed_struct_size_is_known() {
        assert_eq!(Fixed::FIXED_SIZE, Some(32 + 10 + 2));
        assert_eq!(fixed().size(), 44);
    }

    #[test]
    fn empty_struct_is_zero_bytes() {
        assert_eq!(Empty::FIXED_SIZE, Some(0));
        assert!(Empty {}.to_bytes().unwrap().is_empty());
        assert_eq!(Empty::from_bytes(&[1, 2]).unwrap(), (Empty {}, 0));
    }

    #[test]
    fn decode_at_offset_threads_the_cursor() {
        let value = fixed();
        let mut buf = vec![0xee; 3 + value.size()];
        let end = value.encode(&mut buf, 3).unwrap();
        assert_eq!(end, buf.len());
        assert_eq!(Fixed::decode(&buf, 3).unwrap(), (value, end));
    }

    #[test]
    fn nested_roundtrip() {
        let value = Nested {
            inner: fixed(),
            names: vec!["alpha".into(), "beta".into()],
        };
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes.len(), value.size());
        assert_eq!(Nested::from_bytes_exact(&bytes).unwrap(), value);
    }

    #[test]
    fn every_truncation_fails() {
        let value = Sample {
            a: 7,
            b: 1_000_000,
            c: Some(Pubkey::new_from_array([5; 32])),
        };
        let bytes = value.to_bytes().unwrap();
        for len in 0..bytes.len() {
            let err = Sample::from_bytes(&bytes[..len]).unwrap_err();
            assert!(
                matches!(err, CodecError::UnexpectedEndOfBuffer { .. }),
                "prefix of {len} bytes gave {err:?}"
            );
        }
    }

    #[test]
    fn encode_into_short_buffer_fails() {
        let value = fixed();
        let mut buf = vec![0u8; 20];
        assert!(value.encode(&mut buf, 0).is_err());
    }
}
