//! 32-byte account addresses.
//!
//! On the wire a public key is its 32 raw bytes. For humans it is the
//! Base58 encoding of those bytes, using the Bitcoin alphabet `bs58` ships.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::Codec;
use crate::cursor::{read_array, write_bytes};
use crate::error::{CodecError, Result};

pub const PUBKEY_BYTES: usize = 32;

/// An account or program address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; PUBKEY_BYTES] {
        self.0
    }

    pub fn as_array(&self) -> &[u8; PUBKEY_BYTES] {
        &self.0
    }

    /// Parse a Base58 address string.
    pub fn from_base58(address: &str) -> Result<Self> {
        let bytes = bs58::decode(address)
            .into_vec()
            .map_err(|e| CodecError::InvalidEncoding(format!("base58 decode failed: {e}")))?;

        let arr: [u8; PUBKEY_BYTES] = bytes.try_into().map_err(|v: Vec<u8>| {
            CodecError::InvalidEncoding(format!("expected 32 address bytes, got {}", v.len()))
        })?;

        Ok(Self(arr))
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; PUBKEY_BYTES]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Pubkey {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_base58(s)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self.to_base58())
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}

impl Codec for Pubkey {
    const FIXED_SIZE: Option<usize> = Some(PUBKEY_BYTES);

    fn size(&self) -> usize {
        PUBKEY_BYTES
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        write_bytes(buf, offset, &self.0)
    }

    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (bytes, next) = read_array::<PUBKEY_BYTES>(buf, offset)?;
        Ok((Self(bytes), next))
    }
}
