//! Data-enum codecs.
//!
//! [`codec_enum!`](crate::codec_enum) declares an enum whose variants carry
//! an explicit `u8` tag. Encoding writes the tag and then the variant's
//! fields in order; a unit variant is just its tag. Decoding an unlisted tag
//! fails with [`CodecError::UnknownVariant`](crate::CodecError::UnknownVariant).
//! Two variants sharing a tag is rejected at compile time.
//!
//! ```
//! use program_codec::{codec_enum, Codec, CodecError, Pubkey};
//!
//! codec_enum! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub enum VaultInstruction {
//!         Init = 0,
//!         Deposit { amount: u64 } = 1,
//!         SetAuthority { new_authority: Pubkey } = 2,
//!     }
//! }
//!
//! let ix = VaultInstruction::Deposit { amount: 5 };
//! let bytes = ix.to_bytes().unwrap();
//! assert_eq!(bytes[0], 1);
//! assert_eq!(VaultInstruction::from_bytes_exact(&bytes).unwrap(), ix);
//! assert_eq!(
//!     VaultInstruction::from_bytes(&[3]).unwrap_err(),
//!     CodecError::UnknownVariant(3)
//! );
//! ```

#[macro_export]
macro_rules! codec_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident $( {
                    $(
                        $(#[$fmeta:meta])*
                        $field:ident : $fty:ty
                    ),* $(,)?
                } )? = $tag:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant $( {
                    $(
                        $(#[$fmeta])*
                        $field: $fty,
                    )*
                } )?,
            )*
        }

        impl $name {
            /// Tag byte written ahead of this variant's fields.
            pub fn tag(&self) -> u8 {
                match self {
                    $( Self::$variant { .. } => $tag, )*
                }
            }

            pub fn variant_name(&self) -> &'static str {
                match self {
                    $( Self::$variant { .. } => stringify!($variant), )*
                }
            }
        }

        impl $crate::Codec for $name {
            const FIXED_SIZE: ::core::option::Option<usize> = $crate::codec::prefixed_fixed(
                1,
                $crate::codec::uniform_fixed(&[
                    $(
                        $crate::codec::sum_fixed(&[
                            $( $( <$fty as $crate::Codec>::FIXED_SIZE ),* )?
                        ]),
                    )*
                ]),
            );

            fn size(&self) -> usize {
                1 + match self {
                    $(
                        Self::$variant { $( $( $field ),* )? } => {
                            0 $( $( + $crate::Codec::size($field) )* )?
                        }
                    )*
                }
            }

            fn encode(&self, buf: &mut [u8], offset: usize) -> $crate::Result<usize> {
                let offset = $crate::Codec::encode(&self.tag(), buf, offset)?;
                match self {
                    $(
                        Self::$variant { $( $( $field ),* )? } => {
                            $( $( let offset = $crate::Codec::encode($field, buf, offset)?; )* )?
                            ::core::result::Result::Ok(offset)
                        }
                    )*
                }
            }

            #[deny(unreachable_patterns)]
            fn decode(buf: &[u8], offset: usize) -> $crate::Result<(Self, usize)> {
                let (tag, offset) = <u8 as $crate::Codec>::decode(buf, offset)?;
                match tag {
                    $(
                        $tag => {
                            $( $( let ($field, offset) = <$fty as $crate::Codec>::decode(buf, offset)?; )* )?
                            ::core::result::Result::Ok((Self::$variant { $( $( $field ),* )? }, offset))
                        }
                    )*
                    other => ::core::result::Result::Err($crate::CodecError::UnknownVariant(other.into())),
                }
            }
        }
    };
}
