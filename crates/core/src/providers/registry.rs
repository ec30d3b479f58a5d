use crate::models::caip::ChainId;
use crate::models::settings::Settings;

use super::bitcoin::BitcoinAdapter;
use super::evm::EvmAdapter;
use super::traits::ChainAdapter;

/// Registry of all available chain adapters.
///
/// Routes account fetches to the correct adapter based on `ChainId`.
/// New chains can be added without modifying existing code.
pub struct ChainAdapterRegistry {
    adapters: Vec<Box<dyn ChainAdapter>>,
}

impl ChainAdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Create a registry with the default mainnet adapters pre-configured.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();

        // Ethereum mainnet over JSON-RPC, tracking the well-known ERC-20 set
        registry.register(Box::new(EvmAdapter::ethereum_mainnet(
            settings.eth_rpc_url.clone(),
        )));

        // Bitcoin mainnet over a Blockbook-style REST API
        registry.register(Box::new(BitcoinAdapter::bitcoin_mainnet(
            settings.bitcoin_api_url.clone(),
        )));

        registry
    }

    /// Register a new chain adapter.
    pub fn register(&mut self, adapter: Box<dyn ChainAdapter>) {
        self.adapters.push(adapter);
    }

    /// Find the adapter serving the given chain.
    pub fn get(&self, chain_id: &ChainId) -> Option<&dyn ChainAdapter> {
        self.adapters
            .iter()
            .find(|a| a.chain_id() == chain_id)
            .map(|a| a.as_ref())
    }

    /// Chains for which an adapter is registered.
    pub fn supported_chains(&self) -> Vec<&ChainId> {
        self.adapters.iter().map(|a| a.chain_id()).collect()
    }
}

impl Default for ChainAdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
