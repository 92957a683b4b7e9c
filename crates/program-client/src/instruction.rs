//! Instruction envelopes.
//!
//! An [`Instruction`] is the program id, the ordered account list with
//! signer/writable flags, and the opaque data payload. Building one from a
//! typed argument struct is the forward half of the pipeline; reading the
//! payload back is [`decode_instruction_data`].

use program_codec::{Codec, Pubkey, Record};
use tracing::trace;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// Writable, not a signer.
    pub fn new(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: false,
            is_writable: true,
        }
    }

    /// Read-only, not a signer.
    pub fn new_readonly(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: false,
            is_writable: false,
        }
    }

    /// Writable signer, e.g. a fee payer.
    pub fn signer(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: true,
            is_writable: true,
        }
    }

    /// Read-only signer, e.g. an authority.
    pub fn readonly_signer(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: true,
            is_writable: false,
        }
    }
}

/// A program instruction, before it is compiled into a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    /// Instruction whose data is `args` framed by its discriminator.
    pub fn new_with_record<R: Record>(program_id: Pubkey, args: &R, accounts: Vec<AccountMeta>) -> Result<Self> {
        let data = args.to_record_bytes()?;
        trace!(%program_id, len = data.len(), "built record instruction");
        Ok(Self {
            program_id,
            accounts,
            data,
        })
    }

    /// Instruction whose data is `args` encoded as-is.
    ///
    /// For programs whose selector is part of the argument layout itself,
    /// such as a tagged instruction enum.
    pub fn new_with_codec<C: Codec>(program_id: Pubkey, args: &C, accounts: Vec<AccountMeta>) -> Result<Self> {
        let data = args.to_bytes()?;
        trace!(%program_id, len = data.len(), "built instruction");
        Ok(Self {
            program_id,
            accounts,
            data,
        })
    }

    pub fn signers(&self) -> impl Iterator<Item = &Pubkey> {
        self.accounts.iter().filter(|m| m.is_signer).map(|m| &m.pubkey)
    }
}

/// Decode an instruction's data as record `R`, requiring the whole payload
/// be consumed.
pub fn decode_instruction_data<R: Record>(instruction: &Instruction) -> Result<R> {
    let (args, consumed) = R::from_record_bytes(&instruction.data)?;
    if consumed != instruction.data.len() {
        return Err(program_codec::CodecError::TrailingBytes {
            consumed,
            total: instruction.data.len(),
        }
        .into());
    }
    Ok(args)
}
