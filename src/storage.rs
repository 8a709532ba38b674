// src/storage.rs
use crate::wallet::{Wallet, WalletInfo};
use std::path::Path;

fn get_storage_dir() -> String {
    let home_dir = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home_dir}/.satchel")
}

fn get_wallets_file_path() -> String {
    format!("{}/wallets.json", get_storage_dir())
}

fn get_rpc_file_path() -> String {
    format!("{}/rpc.json", get_storage_dir())
}

fn ensure_storage_dir() -> Result<(), std::io::Error> {
    std::fs::create_dir_all(get_storage_dir())
}

pub fn save_wallet_to_storage(wallet_info: &WalletInfo) {
    let mut wallets = load_wallets_from_storage();
    wallets.retain(|w| w.address != wallet_info.address);
    wallets.push(wallet_info.clone());

    if let Err(e) = ensure_storage_dir() {
        log::error!("Failed to create storage directory: {}", e);
        return;
    }

    let wallet_file = get_wallets_file_path();
    match serde_json::to_string_pretty(&wallets) {
        Ok(serialized) => {
            if let Err(e) = std::fs::write(&wallet_file, serialized) {
                log::error!("Failed to write wallets to {}: {}", wallet_file, e);
            } else {
                log::info!("Saved {} wallets to {}", wallets.len(), wallet_file);
            }
        }
        Err(e) => log::error!("Failed to serialize wallets: {}", e),
    }
}

pub fn load_wallets_from_storage() -> Vec<WalletInfo> {
    let wallet_file = get_wallets_file_path();
    if !Path::new(&wallet_file).exists() {
        return Vec::new();
    }

    match std::fs::read_to_string(&wallet_file) {
        Ok(data) => match serde_json::from_str::<Vec<WalletInfo>>(&data) {
            Ok(wallets) => wallets,
            Err(e) => {
                log::error!("Failed to parse wallets from {}: {}", wallet_file, e);
                Vec::new()
            }
        },
        Err(e) => {
            log::error!("Failed to read wallets from {}: {}", wallet_file, e);
            Vec::new()
        }
    }
}

pub fn import_wallet_from_key(private_key: &str, name: String) -> Result<WalletInfo, String> {
    let private_key = private_key.trim();
    let bytes = bs58::decode(private_key)
        .into_vec()
        .map_err(|e| format!("Invalid base58 key: {}", e))?;
    let wallet = Wallet::from_private_key(&bytes, name)?;
    Ok(wallet.to_wallet_info())
}

pub fn save_rpc_to_storage(rpc_url: &str) {
    if let Err(e) = ensure_storage_dir() {
        log::error!("Failed to create storage directory: {}", e);
        return;
    }
    let rpc_file = get_rpc_file_path();
    if let Err(e) = std::fs::write(&rpc_file, serde_json::json!({ "rpc_url": rpc_url }).to_string()) {
        log::error!("Failed to write RPC config: {}", e);
    }
}

pub fn load_rpc_from_storage() -> Option<String> {
    let rpc_file = get_rpc_file_path();
    let data = std::fs::read_to_string(rpc_file).ok()?;
    let value: serde_json::Value = serde_json::from_str(&data).ok()?;
    value["rpc_url"].as_str().map(|s| s.to_string())
}
