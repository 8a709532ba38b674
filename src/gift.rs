// src/gift.rs
//
// Gift transfers escrow value under a claim code instead of a recipient
// address. The code deterministically derives an ed25519 keypair, so
// whoever holds the code can sign the escrow's sweep. Creation is just a
// normal transfer to the derived address; this module owns the code
// format, derivation, and the claim/cancel sweeps.

use crate::rpc;
use crate::signing::SoftwareSigner;
use crate::transaction::{TransferCapability, TransferError, WalletTransfer};
use crate::wallet::Wallet;
use rand::RngCore;
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;

/// Gifts below this USD value cannot be created.
pub const GIFT_MIN_USD: f64 = 1.0;

/// Lamports added on top of a gift when the sender covers the claimer's
/// first transaction fees ("starter gas").
pub const STARTER_GAS_LAMPORTS: u64 = 1_000_000;

/// Lamports the escrow keeps back to pay its own sweep fee.
const CLAIM_FEE_RESERVE: u64 = 10_000;

/// A 16-byte random code, shared out of band as base58.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimCode([u8; 16]);

impl ClaimCode {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// The escrow keypair is the SHA-256 of the code used as an ed25519
    /// seed; anyone holding the code can re-derive it.
    pub fn escrow_wallet(&self) -> Wallet {
        let digest = Sha256::digest(self.0);
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&digest);
        Wallet::from_seed(seed, "gift escrow".to_string())
    }

    pub fn escrow_address(&self) -> Pubkey {
        let wallet = self.escrow_wallet();
        Pubkey::new_from_array(wallet.signing_key.verifying_key().to_bytes())
    }
}

impl std::fmt::Display for ClaimCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl FromStr for ClaimCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| format!("Invalid claim code: {}", e))?;
        if bytes.len() != 16 {
            return Err(format!("Invalid claim code length: {} bytes", bytes.len()));
        }
        let mut code = [0u8; 16];
        code.copy_from_slice(&bytes);
        Ok(Self(code))
    }
}

/// What the claim preview shows before the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftInfo {
    pub escrow: Pubkey,
    pub lamports: u64,
    pub token_accounts: Vec<rpc::TokenAccountInfo>,
    pub claimed: bool,
}

pub struct GiftClient {
    rpc_url: Option<String>,
}

impl GiftClient {
    pub fn new(rpc_url: Option<&str>) -> Self {
        Self {
            rpc_url: rpc_url.map(|s| s.to_string()),
        }
    }

    /// Look up what the escrow currently holds. An empty escrow means the
    /// gift was claimed (or cancelled).
    pub async fn gift_info(&self, code: &ClaimCode) -> Result<GiftInfo, String> {
        let escrow = code.escrow_address();
        let lamports = rpc::get_balance(&escrow.to_string(), self.rpc_url.as_deref()).await?;
        let token_accounts =
            rpc::get_token_accounts_by_owner(&escrow.to_string(), self.rpc_url.as_deref()).await?;
        let has_tokens = token_accounts.iter().any(|a| a.amount > 0);
        Ok(GiftInfo {
            escrow,
            lamports,
            token_accounts,
            claimed: lamports == 0 && !has_tokens,
        })
    }

    /// Claim: sweep the escrow to the claimer's wallet.
    pub async fn claim_gift(
        &self,
        code: &ClaimCode,
        claimer: &Pubkey,
    ) -> Result<Vec<String>, TransferError> {
        self.sweep(code, claimer).await
    }

    /// Cancel: sweep the escrow back to whoever created the gift.
    pub async fn cancel_gift(
        &self,
        code: &ClaimCode,
        creator: &Pubkey,
    ) -> Result<Vec<String>, TransferError> {
        self.sweep(code, creator).await
    }

    async fn sweep(&self, code: &ClaimCode, dest: &Pubkey) -> Result<Vec<String>, TransferError> {
        let escrow_wallet = code.escrow_wallet();
        let escrow = code.escrow_address();
        let signer = Arc::new(SoftwareSigner::new(escrow_wallet));
        let transfer = WalletTransfer::new(signer, escrow, self.rpc_url.as_deref());

        let mut signatures = Vec::new();

        // Tokens first; the escrow's lamports pay the sweep fees.
        let token_accounts =
            rpc::get_token_accounts_by_owner(&escrow.to_string(), self.rpc_url.as_deref())
                .await
                .map_err(TransferError::Network)?;
        for account in token_accounts.iter().filter(|a| a.amount > 0) {
            let mint = Pubkey::from_str(&account.mint)
                .map_err(|e| TransferError::Rejected(format!("Bad mint in escrow: {}", e)))?;
            let signature = transfer
                .transfer_token(&mint, account.decimals, dest, account.amount)
                .await?;
            signatures.push(signature);
        }

        let lamports = rpc::get_balance(&escrow.to_string(), self.rpc_url.as_deref())
            .await
            .map_err(TransferError::Network)?;
        if lamports > CLAIM_FEE_RESERVE {
            let signature = transfer
                .transfer_native(dest, lamports - CLAIM_FEE_RESERVE)
                .await?;
            signatures.push(signature);
        }

        if signatures.is_empty() {
            return Err(TransferError::Rejected(
                "Gift has already been claimed".to_string(),
            ));
        }

        Ok(signatures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_code_round_trip() {
        let code = ClaimCode::generate();
        let encoded = code.to_string();
        let parsed = ClaimCode::from_str(&encoded).unwrap();
        assert_eq!(parsed, code);
    }

    #[test]
    fn test_escrow_derivation_is_deterministic() {
        let code = ClaimCode::generate();
        let copy = ClaimCode::from_str(&code.to_string()).unwrap();
        assert_eq!(code.escrow_address(), copy.escrow_address());
        assert_ne!(code.escrow_address(), Pubkey::default());
    }

    #[test]
    fn test_distinct_codes_distinct_escrows() {
        let a = ClaimCode::generate();
        let b = ClaimCode::generate();
        assert_ne!(a.escrow_address(), b.escrow_address());
    }

    #[test]
    fn test_claim_code_rejects_garbage() {
        assert!(ClaimCode::from_str("not base58 at all!!!").is_err());
        // valid base58, wrong length
        assert!(ClaimCode::from_str("abc").is_err());
    }
}
