//! Discriminator-prefixed records.
//!
//! Accounts and instructions are framed by a constant byte prefix naming the
//! record type. The prefix is written unconditionally and checked on decode,
//! so reading an account of the wrong type fails instead of yielding garbage.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::codec::Codec;
use crate::cursor::{read_bytes, write_bytes};
use crate::error::{CodecError, Result};

/// Length of Anchor-style account and instruction discriminators.
pub const ANCHOR_DISCRIMINATOR_LEN: usize = 8;

/// A [`Codec`] type framed by a constant discriminator.
pub trait Record: Codec {
    /// Leading bytes identifying the record type.
    const DISCRIMINATOR: &'static [u8];

    /// Whether `buf` starts with this record's discriminator.
    fn matches(buf: &[u8]) -> bool {
        buf.starts_with(Self::DISCRIMINATOR)
    }

    fn record_size(&self) -> usize {
        Self::DISCRIMINATOR.len() + self.size()
    }

    fn encode_record(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        let offset = write_bytes(buf, offset, Self::DISCRIMINATOR)?;
        self.encode(buf, offset)
    }

    fn decode_record(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let offset = check_discriminator(Self::DISCRIMINATOR, buf, offset)?;
        Self::decode(buf, offset)
    }

    fn to_record_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.record_size()];
        self.encode_record(&mut buf, 0)?;
        Ok(buf)
    }

    /// Decode a record from the start of `buf`, returning it with the bytes
    /// consumed.
    fn from_record_bytes(buf: &[u8]) -> Result<(Self, usize)> {
        Self::decode_record(buf, 0)
    }
}

/// Consume `expected` from `buf` at `offset`, failing on any difference.
pub fn check_discriminator(expected: &[u8], buf: &[u8], offset: usize) -> Result<usize> {
    let (actual, next) = read_bytes(buf, offset, expected.len())?;
    if actual != expected {
        debug!(
            expected = %hex::encode(expected),
            actual = %hex::encode(actual),
            "discriminator mismatch"
        );
        return Err(CodecError::DiscriminatorMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(next)
}

/// First 8 bytes of `sha256("{namespace}:{name}")`.
///
/// This is how Anchor programs derive their discriminators. Most programs
/// publish their tables as constants; this helper exists to check them.
pub fn anchor_discriminator(namespace: &str, name: &str) -> [u8; ANCHOR_DISCRIMINATOR_LEN] {
    let hash = Sha256::new()
        .chain_update(namespace.as_bytes())
        .chain_update(b":")
        .chain_update(name.as_bytes())
        .finalize();
    let mut out = [0u8; ANCHOR_DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash[..ANCHOR_DISCRIMINATOR_LEN]);
    out
}

/// Discriminator of an Anchor account type, e.g. `"AuctionHouse"`.
pub fn account_discriminator(name: &str) -> [u8; ANCHOR_DISCRIMINATOR_LEN] {
    anchor_discriminator("account", name)
}

/// Discriminator of an Anchor instruction, by its snake_case handler name.
pub fn instruction_discriminator(name: &str) -> [u8; ANCHOR_DISCRIMINATOR_LEN] {
    anchor_discriminator("global", name)
}

/// `true` when no discriminator in `list` is empty, equal to another, or a
/// prefix of another.
pub const fn discriminators_disjoint(list: &[&[u8]]) -> bool {
    let mut i = 0;
    while i < list.len() {
        if list[i].is_empty() {
            return false;
        }
        let mut j = 0;
        while j < list.len() {
            if i != j && is_prefix(list[i], list[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const fn is_prefix(short: &[u8], long: &[u8]) -> bool {
    if short.len() > long.len() {
        return false;
    }
    let mut k = 0;
    while k < short.len() {
        if short[k] != long[k] {
            return false;
        }
        k += 1;
    }
    true
}

/// Declare an enum over several [`Record`] types, routed by discriminator.
///
/// Each variant wraps exactly one record type. `decode_any` picks the
/// variant whose discriminator prefixes the buffer; none matching is
/// [`CodecError::UnknownDiscriminator`]. Discriminators that collide, or
/// where one is a prefix of another, fail to compile.
#[macro_export]
macro_rules! codec_records {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident ( $record:ty )
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant($record),
            )*
        }

        impl $name {
            /// Decode whichever record `buf` holds, with the bytes consumed.
            pub fn decode_any(buf: &[u8]) -> $crate::Result<(Self, usize)> {
                $(
                    if <$record as $crate::Record>::matches(buf) {
                        let (record, offset) = <$record as $crate::Record>::decode_record(buf, 0)?;
                        $crate::__private::tracing::trace!(
                            record = stringify!($variant),
                            bytes = offset,
                            "routed record by discriminator"
                        );
                        return ::core::result::Result::Ok((Self::$variant(record), offset));
                    }
                )*
                let width = 0usize $( .max(<$record as $crate::Record>::DISCRIMINATOR.len()) )*;
                ::core::result::Result::Err($crate::CodecError::UnknownDiscriminator(
                    buf[..width.min(buf.len())].to_vec(),
                ))
            }

            pub fn discriminator(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant(_) => <$record as $crate::Record>::DISCRIMINATOR, )*
                }
            }

            pub fn record_name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => stringify!($variant), )*
                }
            }

            pub fn to_bytes(&self) -> $crate::Result<::std::vec::Vec<u8>> {
                match self {
                    $( Self::$variant(record) => $crate::Record::to_record_bytes(record), )*
                }
            }
        }

        const _: () = ::core::assert!(
            $crate::record::discriminators_disjoint(&[
                $( <$record as $crate::Record>::DISCRIMINATOR, )*
            ]),
            "codec_records: discriminators must be distinct and prefix-free"
        );
    };
}
