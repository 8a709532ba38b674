// src/signing/mod.rs
use async_trait::async_trait;
use std::error::Error;

pub mod software;

pub use software::SoftwareSigner;

/// Trait for transaction signing methods
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Get the public key of the signer
    async fn get_public_key(&self) -> Result<String, Box<dyn Error>>;

    /// Sign a message/transaction
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, Box<dyn Error>>;

    /// Display name for the signing method
    fn get_name(&self) -> String;
}
