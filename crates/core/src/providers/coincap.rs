use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::asset::Asset;
use crate::models::market::MarketData;
use super::traits::MarketDataProvider;

const BASE_URL: &str = "https://api.coincap.io/v2";

/// CoinCap API provider for cryptocurrency market data.
///
/// - **Free**: No API key required, no strict rate limits.
/// - **Data**: 2000+ cryptocurrencies, USD-quoted.
/// - **Endpoints**: `/assets/{id}`, `/assets?search={symbol}`
///
/// Note: CoinCap uses lowercase ids like "bitcoin", "ethereum".
/// We map common symbols (BTC → bitcoin) and dynamically resolve unknown ones.
pub struct CoinCapProvider {
    client: Client,
    /// Map from uppercase symbol (BTC) to CoinCap asset id (bitcoin).
    /// Seeded with common mappings, extended at runtime via dynamic search.
    symbol_map: Mutex<HashMap<String, String>>,
}

impl CoinCapProvider {
    pub fn new() -> Self {
        let mut symbol_map = HashMap::new();
        // Pre-populate common mappings
        let common = vec![
            ("BTC", "bitcoin"),
            ("ETH", "ethereum"),
            ("USDT", "tether"),
            ("USDC", "usd-coin"),
            ("DAI", "multi-collateral-dai"),
            ("WBTC", "wrapped-bitcoin"),
            ("LINK", "chainlink"),
            ("UNI", "uniswap"),
            ("AAVE", "aave"),
            ("SHIB", "shiba-inu"),
            ("MATIC", "polygon"),
            ("CRO", "crypto-com-coin"),
            ("MANA", "decentraland"),
            ("SAND", "the-sandbox"),
            ("AXS", "axie-infinity"),
        ];
        for (sym, id) in common {
            symbol_map.insert(sym.to_string(), id.to_string());
        }

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            symbol_map: Mutex::new(symbol_map),
        }
    }

    /// Resolve a symbol like "BTC" to a CoinCap ID like "bitcoin".
    /// Checks the static map first.
    pub fn resolve_id(&self, symbol: &str) -> String {
        let upper = symbol.to_uppercase();
        let map = self.symbol_map.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&upper)
            .cloned()
            .unwrap_or_else(|| symbol.to_lowercase())
    }

    /// Dynamically resolve a symbol by searching the CoinCap API.
    /// Caches the result for future lookups.
    async fn resolve_id_dynamic(&self, symbol: &str) -> Result<String, CoreError> {
        let upper = symbol.to_uppercase();

        // Check cache first
        {
            let map = self.symbol_map.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(id) = map.get(&upper) {
                return Ok(id.clone());
            }
        }

        // Search CoinCap API: /assets?search={symbol}&limit=5
        let url = format!("{BASE_URL}/assets?search={upper}&limit=5");
        let resp: AssetsSearchResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("Failed to search for {upper}: {e}"),
            })?;

        // Find the asset whose symbol matches (case-insensitive)
        let matched = resp
            .data
            .iter()
            .find(|a| a.symbol.to_uppercase() == upper)
            .ok_or_else(|| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("No CoinCap asset found for symbol {upper}"),
            })?;

        let id = matched.id.clone();

        // Cache for next time
        {
            let mut map = self.symbol_map.lock().unwrap_or_else(|e| e.into_inner());
            map.insert(upper, id.clone());
        }

        Ok(id)
    }
}

impl Default for CoinCapProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a CoinCap decimal string field, rejecting negatives.
fn parse_quote(raw: &str, symbol: &str) -> Result<Decimal, CoreError> {
    let value: Decimal = raw.parse().map_err(|e| CoreError::Api {
        provider: "CoinCap".into(),
        message: format!("Invalid quote format for {symbol}: {e}"),
    })?;
    if value < Decimal::ZERO {
        return Err(CoreError::Api {
            provider: "CoinCap".into(),
            message: format!("Negative quote returned for {symbol}: {value}"),
        });
    }
    Ok(value)
}

// ── CoinCap API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct AssetResponse {
    data: AssetData,
}

#[derive(Deserialize)]
struct AssetData {
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
    #[serde(rename = "changePercent24Hr")]
    change_percent_24hr: Option<String>,
    #[serde(rename = "marketCapUsd")]
    market_cap_usd: Option<String>,
}

#[derive(Deserialize)]
struct AssetsSearchResponse {
    data: Vec<AssetSearchEntry>,
}

#[derive(Deserialize)]
struct AssetSearchEntry {
    id: String,
    symbol: String,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MarketDataProvider for CoinCapProvider {
    fn name(&self) -> &str {
        "CoinCap"
    }

    async fn market_data(&self, asset: &Asset) -> Result<MarketData, CoreError> {
        let id = self.resolve_id_dynamic(&asset.symbol).await?;
        let url = format!("{BASE_URL}/assets/{id}");

        let resp: AssetResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("Failed to parse response for {}: {e}", asset.symbol),
            })?;

        let price_raw = resp.data.price_usd.ok_or_else(|| CoreError::Api {
            provider: "CoinCap".into(),
            message: format!("No price data for {}", asset.symbol),
        })?;
        let price = parse_quote(&price_raw, &asset.symbol)?;

        // Secondary fields are best-effort: a malformed change or cap must
        // not take down the price itself
        let change_percent_24h = resp
            .data
            .change_percent_24hr
            .and_then(|raw| raw.parse().ok());
        let market_cap = resp
            .data
            .market_cap_usd
            .and_then(|raw| raw.parse().ok());

        Ok(MarketData {
            price,
            change_percent_24h,
            market_cap,
        })
    }
}
