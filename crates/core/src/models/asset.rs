use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::caip::{AssetId, ChainId};

/// Display and precision metadata for one asset (native coin or token).
///
/// **Equality and hashing** are based solely on `asset_id`, NOT on the
/// display fields, so HashMap lookups stay consistent regardless of the
/// name/symbol a data source reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,

    /// Ticker symbol, uppercased (e.g., "ETH", "BTC", "USDC")
    pub symbol: String,

    /// Human-readable name (e.g., "Ethereum", "Bitcoin", "USD Coin")
    pub name: String,

    /// Number of base-unit decimals (18 for ETH, 8 for BTC, 6 for USDC).
    pub precision: u32,
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.asset_id == other.asset_id
    }
}

impl Eq for Asset {}

impl std::hash::Hash for Asset {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.asset_id.hash(state);
    }
}

impl Asset {
    pub fn new(
        asset_id: AssetId,
        symbol: impl Into<String>,
        name: impl Into<String>,
        precision: u32,
    ) -> Self {
        Self {
            asset_id,
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
            precision,
        }
    }
}

/// Registry of asset metadata, keyed by asset id.
///
/// Seeded with well-known assets; extended at runtime as chain adapters
/// discover tokens the seed list doesn't cover.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    assets: HashMap<AssetId, Asset>,
}

impl AssetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with well-known mainnet assets.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let eth = ChainId::ethereum_mainnet();
        let btc = ChainId::bitcoin_mainnet();

        registry.register(Asset::new(eth.native_asset_id(), "ETH", "Ethereum", 18));
        registry.register(Asset::new(btc.native_asset_id(), "BTC", "Bitcoin", 8));

        // Common ERC-20s so fresh portfolios get names before discovery runs
        let tokens: &[(&str, &str, &str, u32)] = &[
            ("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USDC", "USD Coin", 6),
            ("0xdac17f958d2ee523a2206206994597c13d831ec7", "USDT", "Tether", 6),
            ("0x6b175474e89094c44da98b954eedeac495271d0f", "DAI", "Dai Stablecoin", 18),
            ("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "WETH", "Wrapped Ether", 18),
            ("0x2260fac5e5542a773aa44fbcfedf7c193bc2c599", "WBTC", "Wrapped Bitcoin", 8),
            ("0x514910771af9ca656af840dff83e8264ecf986ca", "LINK", "Chainlink", 18),
            ("0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", "UNI", "Uniswap", 18),
        ];
        for (contract, symbol, name, precision) in tokens {
            registry.register(Asset::new(
                AssetId::erc20(&eth, contract),
                *symbol,
                *name,
                *precision,
            ));
        }

        registry
    }

    /// Insert or replace an asset's metadata.
    pub fn register(&mut self, asset: Asset) {
        self.assets.insert(asset.asset_id.clone(), asset);
    }

    /// Insert an asset only if nothing is registered under its id yet.
    /// Keeps curated seed metadata from being clobbered by discovery.
    pub fn register_if_absent(&mut self, asset: Asset) {
        self.assets.entry(asset.asset_id.clone()).or_insert(asset);
    }

    pub fn get(&self, asset_id: &AssetId) -> Option<&Asset> {
        self.assets.get(asset_id)
    }

    /// Base-unit decimals for an asset, if known.
    pub fn precision_of(&self, asset_id: &AssetId) -> Option<u32> {
        self.assets.get(asset_id).map(|a| a.precision)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
