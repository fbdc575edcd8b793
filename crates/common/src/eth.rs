//! Ethereum wallet-address utilities.
//!
//! Login identity is a wallet address; a user proves control of it by
//! signing a challenge message with the standard personal-message scheme
//! (EIP-191). This module validates address syntax, hashes personal
//! messages, and recovers the signing address from a 65-byte signature.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::{AppError, AppResult};

/// Checks that `address` is `0x` followed by exactly 40 hex characters.
/// Case-insensitive; no checksum validation.
#[must_use]
pub fn is_wallet_address(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    body.len() == 40 && body.chars().all(|c| c.is_ascii_hexdigit())
}

/// Validates `address` and returns its lowercase canonical form.
pub fn normalize_address(address: &str) -> AppResult<String> {
    if !is_wallet_address(address) {
        return Err(AppError::Validation(format!(
            "not a valid wallet address: {address}"
        )));
    }
    Ok(address.to_lowercase())
}

/// Keccak-256 hash of a personal message per EIP-191:
/// `"\x19Ethereum Signed Message:\n" + len(message) + message`.
#[must_use]
pub fn personal_message_hash(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n");
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Recovers the lowercase `0x` signing address from `(message, signature)`.
///
/// `signature` is the usual 65-byte `r || s || v` form, hex encoded with an
/// optional `0x` prefix; `v` may be 0/1 or 27/28. Malformed input yields
/// `Validation`; a signature that cannot be recovered yields `Unauthorized`.
pub fn recover_address(message: &str, signature: &str) -> AppResult<String> {
    let raw = signature.strip_prefix("0x").unwrap_or(signature);
    let bytes = hex::decode(raw)
        .map_err(|e| AppError::Validation(format!("invalid signature hex: {e}")))?;
    if bytes.len() != 65 {
        return Err(AppError::Validation(format!(
            "signature must be 65 bytes, got {}",
            bytes.len()
        )));
    }

    let sig = Signature::from_slice(&bytes[..64])
        .map_err(|e| AppError::Validation(format!("invalid signature scalars: {e}")))?;
    let v = match bytes[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        v => {
            return Err(AppError::Validation(format!(
                "invalid signature recovery id: {v}"
            )))
        }
    };
    let recid = RecoveryId::from_byte(v)
        .ok_or_else(|| AppError::Validation("invalid signature recovery id".to_string()))?;

    let digest = personal_message_hash(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &sig, recid)
        .map_err(|_| AppError::Unauthorized("signature verification failed".to_string()))?;

    Ok(address_from_key(&key))
}

/// Ethereum address of a public key: last 20 bytes of the Keccak-256 hash
/// of the uncompressed point (without the 0x04 tag).
fn address_from_key(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    let mut hasher = Keccak256::new();
    hasher.update(&point.as_bytes()[1..]);
    let digest = hasher.finalize();
    format!("0x{}", hex::encode(&digest[12..]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use rand::rngs::OsRng;

    fn sign_personal(key: &SigningKey, message: &str) -> String {
        let digest = personal_message_hash(message);
        let (sig, recid) = key.sign_prehash_recoverable(&digest).unwrap();
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(recid.to_byte() + 27);
        format!("0x{}", hex::encode(bytes))
    }

    #[test]
    fn test_is_wallet_address() {
        assert!(is_wallet_address(
            "0x52908400098527886E0F7030069857D2E4169EE7"
        ));
        assert!(is_wallet_address(
            "0x52908400098527886e0f7030069857d2e4169ee7"
        ));
        assert!(!is_wallet_address("52908400098527886e0f7030069857d2e4169ee7"));
        assert!(!is_wallet_address("0x5290840009852788"));
        assert!(!is_wallet_address(
            "0xzz908400098527886e0f7030069857d2e4169ee7"
        ));
    }

    #[test]
    fn test_normalize_address_lowercases() {
        let normalized =
            normalize_address("0x52908400098527886E0F7030069857D2E4169EE7").unwrap();
        assert_eq!(normalized, "0x52908400098527886e0f7030069857d2e4169ee7");

        assert!(normalize_address("not-an-address").is_err());
    }

    #[test]
    fn test_recover_roundtrip() {
        let key = SigningKey::random(&mut OsRng);
        let expected = address_from_key(key.verifying_key());
        let message = "Sign this message to login: abc123";

        let signature = sign_personal(&key, message);
        let recovered = recover_address(message, &signature).unwrap();

        assert_eq!(recovered, expected);
    }

    #[test]
    fn test_recover_detects_tampered_message() {
        let key = SigningKey::random(&mut OsRng);
        let expected = address_from_key(key.verifying_key());

        let signature = sign_personal(&key, "original message");
        let recovered = recover_address("tampered message", &signature).unwrap();

        // Recovery over a different message yields a different signer.
        assert_ne!(recovered, expected);
    }

    #[test]
    fn test_recover_rejects_malformed_signature() {
        assert!(matches!(
            recover_address("msg", "0x1234"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            recover_address("msg", "zzzz"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_recover_rejects_bad_recovery_id() {
        let mut bytes = vec![1u8; 64];
        bytes.push(9); // not 0/1/27/28
        let signature = format!("0x{}", hex::encode(bytes));
        assert!(matches!(
            recover_address("msg", &signature),
            Err(AppError::Validation(_))
        ));
    }
}
