use program_codec::{CodecError, Pubkey};
use thiserror::Error;

/// Errors raised while deriving addresses or building and reading program
/// payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("too many seeds: {count} given, at most {max} allowed")]
    MaxSeedsExceeded { count: usize, max: usize },

    #[error("seed {index} is {len} bytes, longer than the {max} byte limit")]
    MaxSeedLengthExceeded { index: usize, len: usize, max: usize },

    #[error("seeds derive an address that is not a valid program address")]
    InvalidSeeds,

    #[error("no bump seed produced a valid program address")]
    NoValidBumpFound,

    #[error("account owner mismatch: expected {expected}, found {actual}")]
    OwnerMismatch { expected: Pubkey, actual: Pubkey },

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
