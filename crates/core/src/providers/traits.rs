use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::account::AccountRecord;
use crate::models::asset::Asset;
use crate::models::caip::{ChainId, ChainKind};
use crate::models::market::MarketData;

/// Trait abstraction over per-chain account data sources.
///
/// One implementation per chain backend (EVM JSON-RPC, Blockbook, …). If a
/// backend changes or goes away, only that one implementation is replaced —
/// the orchestrator and normalizer are untouched.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ChainAdapter: Send + Sync {
    /// Human-readable name of this adapter (for logs/errors).
    fn name(&self) -> &str;

    /// The chain this adapter serves.
    fn chain_id(&self) -> &ChainId;

    /// Balance model of the served chain, decoded from the chain id.
    fn kind(&self) -> ChainKind {
        self.chain_id().kind()
    }

    /// Fetch the raw account record for one public key.
    /// Failure is an asynchronous rejection; the orchestrator captures it
    /// per account and never lets it abort sibling requests.
    async fn get_account(&self, pubkey: &str) -> Result<AccountRecord, CoreError>;
}

/// Trait abstraction over market data sources (USD quotes).
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Current market data for one asset. The full metadata record is
    /// passed in so providers can resolve by symbol or by asset id.
    async fn market_data(&self, asset: &Asset) -> Result<MarketData, CoreError>;
}
