// src/domain_resolver.rs - SNS (.sol) domain resolver
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// Cloudflare worker response format for SNS
#[derive(Debug, Deserialize, Serialize)]
struct SnsWorkerResponse {
    s: String,
    result: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum DomainError {
    InvalidDomain,
    NetworkError(String),
    InvalidPubkey,
    NotFound,
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DomainError::InvalidDomain => write!(f, "not a resolvable domain"),
            DomainError::NetworkError(msg) => write!(f, "network error: {}", msg),
            DomainError::InvalidPubkey => write!(f, "resolver returned an invalid public key"),
            DomainError::NotFound => write!(f, "domain not found"),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        Self::NetworkError(format!("{:?}", e))
    }
}

/// Name-service lookup as the send flow sees it: `Ok(None)` is "this name
/// does not map to anything", errors are transport problems.
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Option<Pubkey>, DomainError>;
}

/// Resolves `.sol` names through the public Bonfida worker, with an
/// in-process cache.
pub struct DomainResolver {
    client: reqwest::Client,
    base_url: String,
    cache: Arc<Mutex<HashMap<String, Pubkey>>>,
}

impl DomainResolver {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://sns-sdk-proxy.bonfida.workers.dev".to_string(),
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check if input is a valid Solana pubkey
    pub fn is_pubkey(input: &str) -> bool {
        let trimmed = input.trim();
        trimmed.len() >= 32 && trimmed.len() <= 44 && Pubkey::from_str(trimmed).is_ok()
    }

    /// Check if input looks like a resolvable name: a `.sol` suffix, or a
    /// bare label that is not already a pubkey.
    pub fn is_domain(input: &str) -> bool {
        let trimmed = input.trim().to_lowercase();
        if trimmed.is_empty() {
            return false;
        }
        trimmed.ends_with(".sol") || (!trimmed.contains('.') && !Self::is_pubkey(&trimmed))
    }

    fn trim_sol_tld(domain: &str) -> String {
        domain
            .trim()
            .to_lowercase()
            .strip_suffix(".sol")
            .map(|s| s.to_string())
            .unwrap_or_else(|| domain.trim().to_lowercase())
    }

    async fn resolve_sns(&self, domain: &str) -> Result<Pubkey, DomainError> {
        let clean_domain = Self::trim_sol_tld(domain);

        // Check cache first
        if let Ok(cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&clean_domain) {
                return Ok(*cached);
            }
        }

        let url = format!("{}/resolve/{}", self.base_url, clean_domain);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(DomainError::NetworkError(format!("HTTP {}", response.status())));
        }

        let worker_response: SnsWorkerResponse = response.json().await?;

        match worker_response.s.as_str() {
            "ok" => {
                let result = worker_response.result.ok_or(DomainError::NotFound)?;
                let pubkey = Pubkey::from_str(&result).map_err(|_| DomainError::InvalidPubkey)?;
                if let Ok(mut cache) = self.cache.lock() {
                    cache.insert(clean_domain, pubkey);
                }
                Ok(pubkey)
            }
            "error" => Err(DomainError::NotFound),
            _ => Err(DomainError::NetworkError("Unexpected response".to_string())),
        }
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

impl Default for DomainResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecipientResolver for DomainResolver {
    async fn resolve(&self, name: &str) -> Result<Option<Pubkey>, DomainError> {
        if !Self::is_domain(name) {
            return Err(DomainError::InvalidDomain);
        }
        match self.resolve_sns(name).await {
            Ok(pubkey) => Ok(Some(pubkey)),
            Err(DomainError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pubkey_classification() {
        assert!(DomainResolver::is_pubkey("So11111111111111111111111111111111111111112"));
        assert!(!DomainResolver::is_pubkey("bonfida.sol"));
        assert!(!DomainResolver::is_pubkey("not-a-key"));
        assert!(!DomainResolver::is_pubkey(""));
    }

    #[test]
    fn test_domain_classification() {
        assert!(DomainResolver::is_domain("bonfida.sol"));
        assert!(DomainResolver::is_domain("BONFIDA.SOL"));
        assert!(DomainResolver::is_domain("bonfida"));
        assert!(!DomainResolver::is_domain("bonfida.eth"));
        assert!(!DomainResolver::is_domain(""));
        assert!(!DomainResolver::is_domain("So11111111111111111111111111111111111111112"));
    }

    #[test]
    fn test_trim_sol_tld() {
        assert_eq!(DomainResolver::trim_sol_tld("Bonfida.sol"), "bonfida");
        assert_eq!(DomainResolver::trim_sol_tld("bonfida"), "bonfida");
        assert_eq!(DomainResolver::trim_sol_tld(" bonfida.sol "), "bonfida");
    }
}
