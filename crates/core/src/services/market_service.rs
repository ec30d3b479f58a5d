use futures::future::join_all;
use rust_decimal::Decimal;

use crate::models::asset::Asset;
use crate::models::market::{MarketData, MarketDataMap};
use crate::providers::coincap::CoinCapProvider;
use crate::providers::traits::MarketDataProvider;

/// Fetches USD market data for held assets from registered providers.
///
/// Providers are tried in registration order per asset. If the primary
/// fails (API down, rate limited, unknown asset), the next one is tried.
/// An asset for which every provider fails simply has no entry in the
/// resulting map — valuation then reports zero for it.
pub struct MarketService {
    providers: Vec<Box<dyn MarketDataProvider>>,
}

impl MarketService {
    /// Create a service with no providers (register them explicitly).
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a service with the default providers pre-configured.
    pub fn new_with_defaults() -> Self {
        let mut service = Self::new();
        // CoinCap — crypto, no API key needed
        service.register(Box::new(CoinCapProvider::new()));
        service
    }

    /// Register a market data provider. Registration order is fallback order.
    pub fn register(&mut self, provider: Box<dyn MarketDataProvider>) {
        self.providers.push(provider);
    }

    /// Get the names of all registered providers.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Fetch market data for every given asset concurrently.
    /// The returned map holds an entry per asset that any provider could
    /// quote; the rest are logged and omitted.
    pub async fn fetch_for_assets(&self, assets: &[Asset]) -> MarketDataMap {
        let lookups = assets.iter().map(|asset| async move {
            self.fetch_one(asset)
                .await
                .map(|data| (asset.asset_id.clone(), data))
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }

    /// Internal: fetch one asset's market data with automatic fallback.
    /// Validates that returned prices are non-negative.
    async fn fetch_one(&self, asset: &Asset) -> Option<MarketData> {
        for provider in &self.providers {
            match provider.market_data(asset).await {
                Ok(data) if data.price >= Decimal::ZERO => return Some(data),
                Ok(data) => {
                    tracing::warn!(
                        provider = provider.name(),
                        asset = %asset.asset_id,
                        price = %data.price,
                        "provider returned negative price, trying next"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        asset = %asset.asset_id,
                        error = %e,
                        "market data fetch failed, trying next provider"
                    );
                }
            }
        }
        tracing::warn!(asset = %asset.asset_id, "no market data from any provider");
        None
    }
}

impl Default for MarketService {
    fn default() -> Self {
        Self::new()
    }
}
