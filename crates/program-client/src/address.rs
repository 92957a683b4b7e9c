//! Base58 address strings as they arrive from users and RPC payloads.
//!
//! Failures come back as [`ClientError::InvalidAddress`] carrying the reason,
//! rather than the lower-level codec error.

use program_codec::{Pubkey, PUBKEY_BYTES};

use crate::error::{ClientError, Result};

/// Decode a Base58 address into a [`Pubkey`].
pub fn parse_address(address: &str) -> Result<Pubkey> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| ClientError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: [u8; PUBKEY_BYTES] = bytes.try_into().map_err(|v: Vec<u8>| {
        ClientError::InvalidAddress(format!("expected {PUBKEY_BYTES} bytes, got {}", v.len()))
    })?;

    Ok(Pubkey::new_from_array(arr))
}

/// Decode an address that must be program-derived, i.e. off the curve.
///
/// Wallet keys are rejected, which catches a user key pasted where a PDA
/// was expected.
#[cfg(feature = "curve25519")]
pub fn parse_program_derived_address(address: &str) -> Result<Pubkey> {
    let key = parse_address(address)?;
    if crate::pda::is_on_curve(key.as_array()) {
        return Err(ClientError::InvalidAddress(format!(
            "{address} is on the ed25519 curve, not a program address"
        )));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::TOKEN_PROGRAM_ID;

    #[test]
    fn parse_known_program_id() {
        let key = parse_address("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA").unwrap();
        assert_eq!(key, TOKEN_PROGRAM_ID);
    }

    #[test]
    fn parse_rejects_bad_alphabet() {
        // '0', 'O', 'I' and 'l' are not in the Base58 alphabet.
        let err = parse_address("0OIl").unwrap_err();
        assert!(matches!(err, ClientError::InvalidAddress(ref msg) if msg.contains("base58")));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let short = bs58::encode([1u8; 31]).into_string();
        let err = parse_address(&short).unwrap_err();
        assert_eq!(err, ClientError::InvalidAddress("expected 32 bytes, got 31".into()));
    }

    #[test]
    fn parse_roundtrips_display() {
        let key = Pubkey::new_from_array([7; 32]);
        assert_eq!(parse_address(&key.to_string()).unwrap(), key);
    }

    #[cfg(feature = "curve25519")]
    #[test]
    fn program_derived_address_must_be_off_curve() {
        let (pda, _) = crate::pda::find_program_address(&[b"vault"], &TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(parse_program_derived_address(&pda.to_string()).unwrap(), pda);

        let signing = ed25519_dalek::SigningKey::from_bytes(&[0x11; 32]);
        let wallet = Pubkey::new_from_array(signing.verifying_key().to_bytes());
        let err = parse_program_derived_address(&wallet.to_string()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidAddress(_)));
    }
}
