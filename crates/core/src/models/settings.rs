use serde::{Deserialize, Serialize};

/// User-configurable settings for endpoints and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// The fiat currency in which portfolio values are displayed.
    /// Market data providers quote USD; other currencies would need a
    /// conversion step in front of the valuation layer.
    pub fiat_currency: String,

    /// JSON-RPC endpoint for Ethereum-style chains.
    pub eth_rpc_url: String,

    /// Blockbook-style REST endpoint for Bitcoin-style chains.
    pub bitcoin_api_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fiat_currency: "USD".to_string(),
            eth_rpc_url: "https://ethereum-rpc.publicnode.com".to_string(),
            bitcoin_api_url: "https://btc1.trezor.io".to_string(),
        }
    }
}
