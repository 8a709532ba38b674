// src/prices.rs
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

const JUPITER_PRICE_API_URL: &str = "https://lite-api.jup.ag/price/v3";
const PRICE_CACHE_TIMEOUT: u64 = 120; // 2 minutes

pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

// Well-known mints shown with symbols even before metadata loads
pub const TOKEN_MINTS: &[(&str, &str)] = &[
    ("SOL", SOL_MINT),
    ("USDC", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
    ("USDT", "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"),
    ("JUP", "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN"),
    ("BONK", "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263"),
];

pub fn symbol_for_mint(mint: &str) -> Option<&'static str> {
    TOKEN_MINTS
        .iter()
        .find(|(_, m)| *m == mint)
        .map(|(symbol, _)| *symbol)
}

// Jupiter API V3 response structure
#[derive(Debug, Deserialize)]
struct JupiterTokenPrice {
    #[serde(rename = "usdPrice")]
    usd_price: f64,
}

// Cache: mint -> usd price, plus the fetch instant
static PRICE_CACHE: OnceLock<Mutex<(HashMap<String, f64>, Instant)>> = OnceLock::new();

fn get_price_cache() -> &'static Mutex<(HashMap<String, f64>, Instant)> {
    PRICE_CACHE.get_or_init(|| Mutex::new((HashMap::new(), Instant::now())))
}

/// USD prices for the given mints from the Jupiter lite API, served from
/// the cache within the timeout window.
pub async fn get_prices_for_mints(
    mint_addresses: &[String],
) -> Result<HashMap<String, f64>, Box<dyn Error>> {
    // Serve from cache if fresh and complete
    if let Ok(cache) = get_price_cache().lock() {
        let (prices, fetched_at) = &*cache;
        let fresh = fetched_at.elapsed() < Duration::from_secs(PRICE_CACHE_TIMEOUT);
        if fresh && mint_addresses.iter().all(|m| prices.contains_key(m)) {
            return Ok(mint_addresses
                .iter()
                .map(|m| (m.clone(), prices[m]))
                .collect());
        }
    }

    log::info!("Fetching prices from Jupiter for {} mints", mint_addresses.len());

    let client = Client::new();
    let ids_param = mint_addresses.join(",");

    let response = client
        .get(JUPITER_PRICE_API_URL)
        .query(&[("ids", &ids_param)])
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| format!("Jupiter API request failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(format!("Jupiter API error {}: {}", status, error_text).into());
    }

    let jupiter_response: HashMap<String, JupiterTokenPrice> = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse Jupiter response: {}", e))?;

    let mut prices = HashMap::new();
    for (mint, price) in &jupiter_response {
        prices.insert(mint.clone(), price.usd_price);
    }

    if let Ok(mut cache) = get_price_cache().lock() {
        cache.0.extend(prices.clone());
        cache.1 = Instant::now();
    }

    Ok(prices)
}

/// Current SOL price in USD, used for the fee and gift-value display.
pub async fn get_sol_price_usd() -> Result<f64, Box<dyn Error>> {
    let prices = get_prices_for_mints(&[SOL_MINT.to_string()]).await?;
    prices
        .get(SOL_MINT)
        .copied()
        .ok_or_else(|| "SOL price missing from response".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_for_mint() {
        assert_eq!(symbol_for_mint(SOL_MINT), Some("SOL"));
        assert_eq!(symbol_for_mint("unknown-mint"), None);
    }
}
