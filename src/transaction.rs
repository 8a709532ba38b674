// src/transaction.rs
use crate::rpc;
use crate::signing::TransactionSigner;
use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature as SolanaSignature,
    transaction::VersionedTransaction,
};
use solana_system_interface::instruction as system_instruction;
use spl_token::instruction as token_instruction;
use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;

/// Size of an SPL token account, for rent estimation when a transfer has
/// to create the recipient's associated token account.
const TOKEN_ACCOUNT_SIZE: usize = 165;

#[derive(Debug, Clone)]
pub enum TransferError {
    /// The cluster (or preflight) refused the transaction
    Rejected(String),
    /// Transport-level failure; the transaction may not have left at all
    Network(String),
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TransferError::Rejected(msg) => write!(f, "transaction rejected: {}", msg),
            TransferError::Network(msg) => write!(f, "network error: {}", msg),
        }
    }
}

impl std::error::Error for TransferError {}

/// The mechanism that actually moves value: a plain lamport transfer for
/// the native asset, a token-program transfer for SPL mints. The send
/// flow only sees this trait; tests substitute a recording stub.
#[async_trait]
pub trait TransferCapability: Send + Sync {
    /// Transfer lamports to `to`. Returns the transaction signature.
    async fn transfer_native(&self, to: &Pubkey, lamports: u64) -> Result<String, TransferError>;

    /// Transfer `amount` smallest units of `mint` to the wallet `to`,
    /// creating the recipient's associated token account when missing.
    async fn transfer_token(
        &self,
        mint: &Pubkey,
        decimals: u8,
        to: &Pubkey,
        amount: u64,
    ) -> Result<String, TransferError>;
}

/// Best-effort fee prediction for the would-be transfer.
#[async_trait]
pub trait FeeQuoter: Send + Sync {
    async fn quote_native_fee(&self, to: &Pubkey, lamports: u64) -> Result<u64, String>;

    async fn quote_token_fee(
        &self,
        mint: &Pubkey,
        decimals: u8,
        to: &Pubkey,
        amount: u64,
    ) -> Result<u64, String>;
}

/// Low-level transaction client: build, sign, serialize, broadcast.
pub struct TransactionClient {
    client: reqwest::Client,
    rpc_url: Option<String>,
}

impl TransactionClient {
    pub fn new(rpc_url: Option<&str>) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc_url: rpc_url.map(|s| s.to_string()),
        }
    }

    fn url(&self) -> &str {
        rpc::rpc_url_or_default(self.rpc_url.as_deref())
    }

    /// Get recent blockhash from the network
    pub async fn get_recent_blockhash(&self) -> Result<Hash, Box<dyn Error>> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getLatestBlockhash",
            "params": [{ "commitment": "finalized" }]
        });

        let response = self.client.post(self.url()).json(&request).send().await?;
        let json: Value = response.json().await?;

        if let Some(error) = json.get("error") {
            return Err(format!("RPC error: {:?}", error).into());
        }

        if let Some(blockhash_str) = json["result"]["value"]["blockhash"].as_str() {
            Ok(Hash::from_str(blockhash_str)?)
        } else {
            Err(format!("Failed to get blockhash from response: {:?}", json).into())
        }
    }

    /// Send a signed, base58-encoded transaction
    pub async fn send_transaction(&self, signed_tx: &str) -> Result<String, TransferError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "sendTransaction",
            "params": [
                signed_tx,
                {
                    "encoding": "base58",
                    "skipPreflight": false,
                    "preflightCommitment": "finalized"
                }
            ]
        });

        let response = self
            .client
            .post(self.url())
            .json(&request)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        if let Some(error) = json.get("error") {
            Err(TransferError::Rejected(format!("{:?}", error)))
        } else if let Some(result) = json["result"].as_str() {
            Ok(result.to_string())
        } else {
            Err(TransferError::Network(format!(
                "Unknown error sending transaction: {:?}",
                json
            )))
        }
    }

    /// Build a single-signer transaction from `instructions`, sign it with
    /// `signer`, and broadcast it.
    pub async fn send_instructions(
        &self,
        signer: &dyn TransactionSigner,
        instructions: &[Instruction],
    ) -> Result<String, TransferError> {
        let fee_payer_str = signer
            .get_public_key()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;
        let fee_payer =
            Pubkey::from_str(&fee_payer_str).map_err(|e| TransferError::Rejected(e.to_string()))?;

        let recent_blockhash = self
            .get_recent_blockhash()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let mut message = Message::new(instructions, Some(&fee_payer));
        message.recent_blockhash = recent_blockhash;

        let mut transaction = VersionedTransaction {
            signatures: vec![
                SolanaSignature::default();
                message.header.num_required_signatures as usize
            ],
            message: VersionedMessage::Legacy(message),
        };

        let message_bytes = transaction.message.serialize();
        let signature_bytes = signer
            .sign_message(&message_bytes)
            .await
            .map_err(|e| TransferError::Rejected(e.to_string()))?;

        if signature_bytes.len() != 64 {
            return Err(TransferError::Rejected(format!(
                "Invalid signature length: expected 64, got {}",
                signature_bytes.len()
            )));
        }
        let mut sig_array = [0u8; 64];
        sig_array.copy_from_slice(&signature_bytes);

        if transaction.signatures.len() != 1 {
            return Err(TransferError::Rejected(format!(
                "Expected 1 signature slot, found {}",
                transaction.signatures.len()
            )));
        }
        transaction.signatures[0] = SolanaSignature::from(sig_array);

        let serialized = bincode::serialize(&transaction)
            .map_err(|e| TransferError::Rejected(e.to_string()))?;
        let encoded = bs58::encode(serialized).into_string();

        self.send_transaction(&encoded).await
    }

    /// Poll whether a signature reached confirmed/finalized commitment.
    pub async fn confirm_transaction(&self, signature: &str) -> Result<bool, Box<dyn Error>> {
        match rpc::get_signature_status(signature, self.rpc_url.as_deref()).await? {
            Some(status) => Ok(status == "finalized" || status == "confirmed"),
            None => Ok(false),
        }
    }

    /// Fee for a message containing `instructions` with `fee_payer`.
    async fn fee_for_instructions(
        &self,
        fee_payer: &Pubkey,
        instructions: &[Instruction],
    ) -> Result<u64, String> {
        let recent_blockhash = self
            .get_recent_blockhash()
            .await
            .map_err(|e| format!("{}", e))?;

        let mut message = Message::new(instructions, Some(fee_payer));
        message.recent_blockhash = recent_blockhash;

        let message_b64 = base64::engine::general_purpose::STANDARD.encode(message.serialize());
        rpc::get_fee_for_message(&message_b64, self.rpc_url.as_deref()).await
    }
}

/// A transfer capability bound to one wallet's signer. The send flow
/// takes this through its trait seams.
pub struct WalletTransfer {
    client: TransactionClient,
    signer: Arc<dyn TransactionSigner>,
    owner: Pubkey,
    rpc_url: Option<String>,
}

impl WalletTransfer {
    pub fn new(
        signer: Arc<dyn TransactionSigner>,
        owner: Pubkey,
        rpc_url: Option<&str>,
    ) -> Self {
        Self {
            client: TransactionClient::new(rpc_url),
            signer,
            owner,
            rpc_url: rpc_url.map(|s| s.to_string()),
        }
    }

    pub fn client(&self) -> &TransactionClient {
        &self.client
    }

    fn native_transfer_ix(&self, to: &Pubkey, lamports: u64) -> Instruction {
        system_instruction::transfer(&self.owner, to, lamports)
    }

    /// Instructions for an SPL transfer to the wallet `to`: an idempotent
    /// ATA create (no-op when the account exists) plus transfer_checked.
    fn token_transfer_ixs(
        &self,
        mint: &Pubkey,
        decimals: u8,
        to: &Pubkey,
        amount: u64,
    ) -> Result<Vec<Instruction>, String> {
        let source = spl_associated_token_account::get_associated_token_address(&self.owner, mint);
        let destination = spl_associated_token_account::get_associated_token_address(to, mint);

        let create_ata = spl_associated_token_account::instruction::create_associated_token_account_idempotent(
            &self.owner,
            to,
            mint,
            &spl_token::id(),
        );

        let transfer = token_instruction::transfer_checked(
            &spl_token::id(),
            &source,
            mint,
            &destination,
            &self.owner,
            &[],
            amount,
            decimals,
        )
        .map_err(|e| format!("Failed to create transfer instruction: {}", e))?;

        Ok(vec![create_ata, transfer])
    }
}

#[async_trait]
impl TransferCapability for WalletTransfer {
    async fn transfer_native(&self, to: &Pubkey, lamports: u64) -> Result<String, TransferError> {
        log::info!("Sending {} lamports from {} to {}", lamports, self.owner, to);
        let ix = self.native_transfer_ix(to, lamports);
        self.client.send_instructions(self.signer.as_ref(), &[ix]).await
    }

    async fn transfer_token(
        &self,
        mint: &Pubkey,
        decimals: u8,
        to: &Pubkey,
        amount: u64,
    ) -> Result<String, TransferError> {
        log::info!("Sending {} units of {} from {} to {}", amount, mint, self.owner, to);
        let ixs = self
            .token_transfer_ixs(mint, decimals, to, amount)
            .map_err(TransferError::Rejected)?;
        self.client.send_instructions(self.signer.as_ref(), &ixs).await
    }
}

#[async_trait]
impl FeeQuoter for WalletTransfer {
    async fn quote_native_fee(&self, to: &Pubkey, lamports: u64) -> Result<u64, String> {
        let ix = self.native_transfer_ix(to, lamports);
        self.client.fee_for_instructions(&self.owner, &[ix]).await
    }

    async fn quote_token_fee(
        &self,
        mint: &Pubkey,
        decimals: u8,
        to: &Pubkey,
        amount: u64,
    ) -> Result<u64, String> {
        let ixs = self.token_transfer_ixs(mint, decimals, to, amount)?;
        let mut fee = self.client.fee_for_instructions(&self.owner, &ixs).await?;

        // A missing destination ATA means the sender also pays its rent.
        let destination = spl_associated_token_account::get_associated_token_address(to, mint);
        if !rpc::account_exists(&destination.to_string(), self.rpc_url.as_deref()).await? {
            fee += rpc::get_minimum_balance_for_rent_exemption(
                TOKEN_ACCOUNT_SIZE,
                self.rpc_url.as_deref(),
            )
            .await?;
        }

        Ok(fee)
    }
}
