//! Reading program accounts.
//!
//! Fetching is someone else's job; this module starts from the bytes and
//! owner an RPC response carries and turns them into a typed record.

use program_codec::{Pubkey, Record};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Raw account state as returned by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountData {
    pub pubkey: Pubkey,
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: Vec<u8>,
}

impl AccountData {
    pub fn new(pubkey: Pubkey, owner: Pubkey, lamports: u64, data: Vec<u8>) -> Self {
        Self {
            pubkey,
            owner,
            lamports,
            data,
        }
    }

    /// Check the account is owned by `expected`.
    pub fn check_owner(&self, expected: &Pubkey) -> Result<()> {
        if self.owner != *expected {
            debug!(account = %self.pubkey, %expected, actual = %self.owner, "owner mismatch");
            return Err(ClientError::OwnerMismatch {
                expected: *expected,
                actual: self.owner,
            });
        }
        Ok(())
    }
}

/// Decode `account` as record `R` after checking its owner.
///
/// Account data is often allocated larger than the record it holds, so
/// trailing bytes are ignored.
pub fn decode_account<R: Record>(account: &AccountData, expected_owner: &Pubkey) -> Result<R> {
    decode_account_with_offset(account, expected_owner).map(|(record, _)| record)
}

/// Like [`decode_account`], also returning the number of bytes consumed.
pub fn decode_account_with_offset<R: Record>(account: &AccountData, expected_owner: &Pubkey) -> Result<(R, usize)> {
    account.check_owner(expected_owner)?;
    Ok(R::from_record_bytes(&account.data)?)
}
