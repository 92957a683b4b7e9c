//! Program-derived addresses.
//!
//! A program-derived address (PDA) is
//! `SHA-256(seed_0 || .. || seed_n || program_id || "ProgramDerivedAddress")`
//! accepted only when the hash is NOT a valid Ed25519 point, so that no
//! private key can sign for it. `find_*` appends a one-byte bump seed and
//! walks it from 255 down to 0, returning the first accepted address. The
//! order matches the runtime's, which makes the bump canonical.
//!
//! The acceptance test is a plain predicate so callers without the
//! `curve25519` feature can supply their own.

use program_codec::{Pubkey, PUBKEY_BYTES};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::error::{ClientError, Result};

/// Maximum number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Domain separator appended after the program id.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

fn check_seeds(seeds: &[&[u8]]) -> Result<()> {
    if seeds.len() > MAX_SEEDS {
        return Err(ClientError::MaxSeedsExceeded {
            count: seeds.len(),
            max: MAX_SEEDS,
        });
    }
    if let Some((index, seed)) = seeds.iter().enumerate().find(|(_, s)| s.len() > MAX_SEED_LEN) {
        return Err(ClientError::MaxSeedLengthExceeded {
            index,
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }
    Ok(())
}

fn hash_seeds(seeds: &[&[u8]], bump: Option<u8>, program_id: &Pubkey) -> [u8; PUBKEY_BYTES] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

/// Derive the address for `seeds` exactly as given, accepting it only if
/// `is_valid` returns true for the hashed bytes.
pub fn create_program_address_with<F>(seeds: &[&[u8]], program_id: &Pubkey, is_valid: F) -> Result<Pubkey>
where
    F: Fn(&[u8; PUBKEY_BYTES]) -> bool,
{
    check_seeds(seeds)?;
    let hash = hash_seeds(seeds, None, program_id);
    if !is_valid(&hash) {
        return Err(ClientError::InvalidSeeds);
    }
    Ok(Pubkey::new_from_array(hash))
}

/// Search bumps 255..=0 for the first address `is_valid` accepts.
///
/// The bump counts against [`MAX_SEEDS`], so at most 15 caller seeds fit.
pub fn find_program_address_with<F>(seeds: &[&[u8]], program_id: &Pubkey, is_valid: F) -> Result<(Pubkey, u8)>
where
    F: Fn(&[u8; PUBKEY_BYTES]) -> bool,
{
    if seeds.len() >= MAX_SEEDS {
        return Err(ClientError::MaxSeedsExceeded {
            count: seeds.len() + 1,
            max: MAX_SEEDS,
        });
    }
    check_seeds(seeds)?;

    for bump in (0u8..=255).rev() {
        let hash = hash_seeds(seeds, Some(bump), program_id);
        if is_valid(&hash) {
            let address = Pubkey::new_from_array(hash);
            debug!(%program_id, %address, bump, "derived program address");
            return Ok((address, bump));
        }
        trace!(%program_id, bump, "bump rejected");
    }

    Err(ClientError::NoValidBumpFound)
}

/// Whether 32 bytes decompress to a point on the Ed25519 curve.
#[cfg(feature = "curve25519")]
pub fn is_on_curve(bytes: &[u8; PUBKEY_BYTES]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

/// The runtime's acceptance test for derived addresses.
#[cfg(feature = "curve25519")]
pub fn is_off_curve(bytes: &[u8; PUBKEY_BYTES]) -> bool {
    !is_on_curve(bytes)
}

/// Derive the address for `seeds` as given, bit-for-bit as the runtime does.
#[cfg(feature = "curve25519")]
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey> {
    create_program_address_with(seeds, program_id, is_off_curve)
}

/// Find the canonical `(address, bump)` for `seeds` under `program_id`.
#[cfg(feature = "curve25519")]
pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    find_program_address_with(seeds, program_id, is_off_curve)
}
