//! Well-known program ids and the addresses they derive.

use program_codec::Pubkey;

#[cfg(feature = "curve25519")]
use crate::error::Result;
#[cfg(feature = "curve25519")]
use crate::pda::find_program_address;

// ---------------------------------------------------------------------------
// Program IDs
// ---------------------------------------------------------------------------

/// System Program: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// SPL Token Program: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79, 0xac,
    0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff, 0x00, 0xa9,
]);

/// SPL Token-2022 Program: `TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb`
pub const TOKEN_2022_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xdd, 0xf6, 0xe1, 0xee, 0x75, 0x8f, 0xde, 0x18, 0x42, 0x5d, 0xbc, 0xe4, 0x6c, 0xcd, 0xda,
    0xb6, 0x1a, 0xfc, 0x4d, 0x83, 0xb9, 0x0d, 0x27, 0xfe, 0xbd, 0xf9, 0x28, 0xd8, 0xa1, 0x8b, 0xfc,
]);

/// Associated Token Account Program: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d, 0x83,
    0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9, 0xf8, 0x59,
]);

/// Token Metadata Program: `metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s`
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x0b, 0x70, 0x65, 0xb1, 0xe3, 0xd1, 0x7c, 0x45, 0x38, 0x9d, 0x52, 0x7f, 0x6b, 0x04, 0xc3, 0xcd,
    0x58, 0xb8, 0x6c, 0x73, 0x1a, 0xa0, 0xfd, 0xb5, 0x49, 0xb6, 0xd1, 0xbc, 0x03, 0xf8, 0x29, 0x46,
]);

/// Seed prefix of every token-metadata PDA.
pub const METADATA_PREFIX: &[u8] = b"metadata";

/// Seed suffix of master and print edition PDAs.
pub const EDITION_SUFFIX: &[u8] = b"edition";

// ---------------------------------------------------------------------------
// Derived addresses
// ---------------------------------------------------------------------------

/// Associated token account of `wallet` for `mint` under the classic token
/// program.
///
/// Seeds: `[wallet, token_program_id, mint]` under the ATA program.
#[cfg(feature = "curve25519")]
pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey> {
    associated_token_address_with_program(wallet, mint, &TOKEN_PROGRAM_ID)
}

/// Associated token account for an explicit token program, e.g. Token-2022.
#[cfg(feature = "curve25519")]
pub fn associated_token_address_with_program(
    wallet: &Pubkey,
    mint: &Pubkey,
    token_program_id: &Pubkey,
) -> Result<Pubkey> {
    find_program_address(
        &[wallet.as_ref(), token_program_id.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Metadata account of `mint`: `["metadata", program_id, mint]`.
#[cfg(feature = "curve25519")]
pub fn metadata_address(mint: &Pubkey) -> Result<(Pubkey, u8)> {
    find_program_address(
        &[METADATA_PREFIX, TOKEN_METADATA_PROGRAM_ID.as_ref(), mint.as_ref()],
        &TOKEN_METADATA_PROGRAM_ID,
    )
}

/// Master edition account of `mint`: `["metadata", program_id, mint, "edition"]`.
#[cfg(feature = "curve25519")]
pub fn master_edition_address(mint: &Pubkey) -> Result<(Pubkey, u8)> {
    find_program_address(
        &[
            METADATA_PREFIX,
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
            EDITION_SUFFIX,
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
}
