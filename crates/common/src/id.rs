//! ID generation utilities.

use rand::RngCore;
use ulid::Ulid;

/// ID generator for entities, login nonces, and simulated transaction
/// hashes.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based entity ID.
    ///
    /// ULIDs are lexicographically sortable and shorter than UUIDs when
    /// represented as strings.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a login nonce: 128 bits of CSPRNG output, hex encoded.
    #[must_use]
    pub fn generate_nonce(&self) -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Generate a simulated transaction hash: `0x` + 32 random bytes, hex
    /// encoded. No real ledger settlement occurs.
    #[must_use]
    pub fn generate_tx_hash(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        format!("0x{}", hex::encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_nonce() {
        let id_gen = IdGenerator::new();
        let nonce = id_gen.generate_nonce();

        assert_eq!(nonce.len(), 32); // 16 bytes hex encoded
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(nonce, id_gen.generate_nonce());
    }

    #[test]
    fn test_generate_tx_hash() {
        let id_gen = IdGenerator::new();
        let hash = id_gen.generate_tx_hash();

        assert!(hash.starts_with("0x"));
        assert_eq!(hash.len(), 66); // 0x + 32 bytes hex
    }
}
