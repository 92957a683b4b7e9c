//! Client-side helpers for on-chain programs.
//!
//! Builds instruction envelopes from typed arguments, decodes account data
//! back into typed records, and derives program addresses. Layouts come from
//! `program-codec`; this crate adds the pieces that involve program ids,
//! owners and account lists. Nothing here performs I/O.

pub mod account;
pub mod address;
pub mod error;
pub mod instruction;
pub mod pda;
pub mod programs;

pub use account::{decode_account, decode_account_with_offset, AccountData};
pub use address::parse_address;
#[cfg(feature = "curve25519")]
pub use address::parse_program_derived_address;
pub use error::{ClientError, Result};
pub use instruction::{decode_instruction_data, AccountMeta, Instruction};
pub use pda::{create_program_address_with, find_program_address_with, MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER};
#[cfg(feature = "curve25519")]
pub use pda::{create_program_address, find_program_address, is_off_curve, is_on_curve};
pub use programs::{
    ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_2022_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
};
#[cfg(feature = "curve25519")]
pub use programs::{
    associated_token_address, associated_token_address_with_program, master_edition_address, metadata_address,
};

pub use program_codec::Pubkey;
