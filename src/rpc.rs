// src/rpc.rs
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error;

const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

pub fn rpc_url_or_default(rpc_url: Option<&str>) -> &str {
    rpc_url.unwrap_or(DEFAULT_RPC_URL)
}

#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: String,
    id: u64,
    method: String,
    params: Vec<serde_json::Value>,
}

impl RpcRequest {
    fn new(method: &str, params: Vec<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: method.to_string(),
            params,
        }
    }
}

async fn post_rpc(url: &str, request: &RpcRequest) -> Result<Value, String> {
    let client = Client::new();
    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(request)
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("RPC error: {}", response.status()));
    }

    let json: Value = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    if let Some(error) = json.get("error") {
        return Err(format!("RPC error: {:?}", error));
    }

    Ok(json)
}

/// Account balance in lamports
pub async fn get_balance(address: &str, rpc_url: Option<&str>) -> Result<u64, String> {
    let request = RpcRequest::new(
        "getBalance",
        vec![
            Value::String(address.to_string()),
            json!({ "commitment": "finalized" }),
        ],
    );

    let json = post_rpc(rpc_url_or_default(rpc_url), &request).await?;
    json["result"]["value"]
        .as_u64()
        .ok_or_else(|| format!("Failed to parse balance from response: {:?}", json))
}

/// True when the account exists on chain. Used to decide whether a token
/// transfer must also create the recipient's associated token account.
pub async fn account_exists(address: &str, rpc_url: Option<&str>) -> Result<bool, String> {
    let request = RpcRequest::new(
        "getAccountInfo",
        vec![
            Value::String(address.to_string()),
            json!({ "encoding": "base64", "commitment": "finalized" }),
        ],
    );

    let json = post_rpc(rpc_url_or_default(rpc_url), &request).await?;
    Ok(!json["result"]["value"].is_null())
}

pub async fn get_minimum_balance_for_rent_exemption(
    account_size: usize,
    rpc_url: Option<&str>,
) -> Result<u64, String> {
    let request = RpcRequest::new("getMinimumBalanceForRentExemption", vec![json!(account_size)]);
    let json = post_rpc(rpc_url_or_default(rpc_url), &request).await?;
    json["result"]
        .as_u64()
        .ok_or_else(|| "Invalid rent exemption response".to_string())
}

/// Fee in lamports for a compiled message (base64-encoded).
pub async fn get_fee_for_message(message_b64: &str, rpc_url: Option<&str>) -> Result<u64, String> {
    let request = RpcRequest::new(
        "getFeeForMessage",
        vec![
            Value::String(message_b64.to_string()),
            json!({ "commitment": "finalized" }),
        ],
    );

    let json = post_rpc(rpc_url_or_default(rpc_url), &request).await?;
    // value is null when the blockhash in the message has expired
    json["result"]["value"]
        .as_u64()
        .ok_or_else(|| format!("No fee available for message: {:?}", json))
}

#[derive(Debug, Deserialize)]
struct TokenAccountsResult {
    value: Vec<TokenAccountEntry>,
}

#[derive(Debug, Deserialize)]
struct TokenAccountEntry {
    account: AccountData,
    pubkey: String,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    parsed: ParsedInfo,
}

#[derive(Debug, Deserialize)]
struct ParsedInfo {
    info: TokenInfo,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    mint: String,
    owner: String,
    state: String,
    #[serde(rename = "tokenAmount")]
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
struct TokenAmount {
    amount: String,
    decimals: u8,
    #[serde(rename = "uiAmount")]
    ui_amount: Option<f64>,
}

/// Token account details in a user-friendly format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenAccountInfo {
    pub pubkey: String,
    pub mint: String,
    pub owner: String,
    /// Raw amount in the mint's smallest units
    pub amount: u64,
    pub decimals: u8,
    pub ui_amount: f64,
    pub state: String,
}

/// Fetches SPL token accounts owned by the given address.
pub async fn get_token_accounts_by_owner(
    address: &str,
    rpc_url: Option<&str>,
) -> Result<Vec<TokenAccountInfo>, String> {
    let request = RpcRequest::new(
        "getTokenAccountsByOwner",
        vec![
            Value::String(address.to_string()),
            json!({ "programId": spl_token::id().to_string() }),
            json!({
                "encoding": "jsonParsed",
                "commitment": "finalized"
            }),
        ],
    );

    let json = post_rpc(rpc_url_or_default(rpc_url), &request).await?;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        result: TokenAccountsResult,
    }

    let rpc_response: Wrapper = serde_json::from_value(json)
        .map_err(|e| format!("Failed to deserialize response: {}", e))?;

    let token_accounts = rpc_response
        .result
        .value
        .into_iter()
        .filter_map(|entry| {
            let info = entry.account.data.parsed.info;
            let amount = info.token_amount.amount.parse::<u64>().ok()?;
            Some(TokenAccountInfo {
                pubkey: entry.pubkey,
                mint: info.mint,
                owner: info.owner,
                amount,
                decimals: info.token_amount.decimals,
                ui_amount: info.token_amount.ui_amount.unwrap_or(0.0),
                state: info.state,
            })
        })
        .collect();

    Ok(token_accounts)
}

/// Confirmation status for a submitted signature, if the cluster has seen it.
pub async fn get_signature_status(
    signature: &str,
    rpc_url: Option<&str>,
) -> Result<Option<String>, Box<dyn Error>> {
    let request = RpcRequest::new("getSignatureStatuses", vec![json!([signature])]);
    let json = post_rpc(rpc_url_or_default(rpc_url), &request)
        .await
        .map_err(|e| -> Box<dyn Error> { e.into() })?;

    Ok(json["result"]["value"][0]["confirmationStatus"]
        .as_str()
        .map(|s| s.to_string()))
}
