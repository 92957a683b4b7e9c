//! Binary layouts for on-chain program state and instruction data.
//!
//! Every type that lives in account data or instruction payloads implements
//! [`Codec`]: a fixed little-endian layout with no self-description, written
//! and read against a caller-supplied buffer and offset. Composite layouts
//! are declared with [`codec_struct!`], [`codec_enum!`] and
//! [`codec_records!`]; layouts only known at runtime use [`schema`].
//!
//! There is no dependency on `solana-program`. [`Pubkey`] is a plain
//! 32-byte array with Base58 display.

pub mod codec;
pub mod cursor;
pub mod enums;
pub mod error;
pub mod option;
pub mod prim;
pub mod pubkey;
pub mod record;
pub mod schema;
pub mod seq;
pub mod string;
pub mod structs;

pub use codec::Codec;
pub use error::{CodecError, Result};
pub use option::COption;
pub use pubkey::{Pubkey, PUBKEY_BYTES};
pub use record::{
    account_discriminator, anchor_discriminator, check_discriminator, discriminators_disjoint,
    instruction_discriminator,
    Record, ANCHOR_DISCRIMINATOR_LEN,
};
pub use schema::{
    DecodedRecord, EnumLayout, Field, Layout, RecordLayout, Registry, StructLayout, TagWidth,
    Value, Variant,
};
pub use seq::FixedVec;
pub use string::{FixedString, STRING_PADDING};

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
