// src/wallet.rs
use bs58;
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

/// Persistable wallet record for storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletInfo {
    pub name: String,
    pub address: String,
    pub keypair_b58: String,
}

/// In-memory wallet holding an ed25519 signing key
#[derive(Debug, Clone)]
pub struct Wallet {
    pub signing_key: SigningKey,
    pub name: String,
}

impl Wallet {
    /// Generate a new random wallet
    pub fn new(name: String) -> Self {
        let seed: [u8; 32] = OsRng.gen();
        Self::from_seed(seed, name)
    }

    /// Reconstruct from a raw private key (32 bytes) or Solana keypair (64 bytes)
    pub fn from_private_key(bytes: &[u8], name: String) -> Result<Self, String> {
        let seed: [u8; 32] = match bytes.len() {
            32 => bytes.try_into().map_err(|_| "Invalid key bytes".to_string())?,
            64 => {
                let seed: [u8; 32] = bytes[..32]
                    .try_into()
                    .map_err(|_| "Invalid key bytes".to_string())?;
                let derived = SigningKey::from_bytes(&seed).verifying_key();
                if derived.as_bytes() != &bytes[32..] {
                    return Err("Public key does not match private key".into());
                }
                seed
            }
            len => return Err(format!("Invalid key length: {} bytes", len)),
        };
        Ok(Self::from_seed(seed, name))
    }

    /// Build a wallet from a fixed 32-byte seed. Used by the gift escrow,
    /// where the keypair must be re-derivable from the claim code.
    pub fn from_seed(seed: [u8; 32], name: String) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
            name,
        }
    }

    /// Base58-encoded Solana-style public key
    pub fn public_key(&self) -> String {
        bs58::encode(self.signing_key.verifying_key().as_bytes()).into_string()
    }

    /// Base58-encoded Solana-compatible keypair (64 bytes)
    pub fn keypair_b58(&self) -> String {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&self.signing_key.to_bytes());
        buf.extend_from_slice(self.signing_key.verifying_key().as_bytes());
        bs58::encode(buf).into_string()
    }

    pub fn to_wallet_info(&self) -> WalletInfo {
        WalletInfo {
            name: self.name.clone(),
            address: self.public_key(),
            keypair_b58: self.keypair_b58(),
        }
    }

    pub fn from_wallet_info(info: &WalletInfo) -> Result<Self, String> {
        let bytes = bs58::decode(&info.keypair_b58)
            .into_vec()
            .map_err(|e| format!("Decode error: {}", e))?;
        Self::from_private_key(&bytes, info.name.clone())
    }

    /// Sign a message with ed25519
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_info_round_trip() {
        let wallet = Wallet::new("test".to_string());
        let info = wallet.to_wallet_info();
        let restored = Wallet::from_wallet_info(&info).unwrap();
        assert_eq!(restored.public_key(), wallet.public_key());
    }

    #[test]
    fn test_from_seed_is_deterministic() {
        let a = Wallet::from_seed([7u8; 32], "a".to_string());
        let b = Wallet::from_seed([7u8; 32], "b".to_string());
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_mismatched_keypair_rejected() {
        let wallet = Wallet::new("test".to_string());
        let mut bytes = bs58::decode(&wallet.keypair_b58()).into_vec().unwrap();
        bytes[40] ^= 0xff;
        assert!(Wallet::from_private_key(&bytes, "bad".to_string()).is_err());
    }
}
