use thiserror::Error;

/// Errors raised while encoding or decoding an on-chain layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of buffer: needed {needed} bytes at offset {offset}, {available} available")]
    UnexpectedEndOfBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("unknown variant tag {0}")]
    UnknownVariant(u32),

    #[error("discriminator mismatch: expected {}, found {}", hex::encode(.expected), hex::encode(.actual))]
    DiscriminatorMismatch { expected: Vec<u8>, actual: Vec<u8> },

    #[error("no record registered for discriminator {}", hex::encode(.0))]
    UnknownDiscriminator(Vec<u8>),

    #[error("value of {actual} exceeds fixed capacity of {capacity}")]
    Overflow { capacity: usize, actual: usize },

    #[error("trailing bytes: consumed {consumed} of {total}")]
    TrailingBytes { consumed: usize, total: usize },

    #[error("type mismatch: layout expects {expected}, value is {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value has no field named {0}")]
    MissingField(String),

    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

pub type Result<T> = std::result::Result<T, CodecError>;
