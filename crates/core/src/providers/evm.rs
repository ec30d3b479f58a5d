use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::account::{AccountRecord, EvmAccount, TokenBalance};
use crate::models::caip::ChainId;
use super::traits::ChainAdapter;

/// Function selector of `balanceOf(address)`, keccak-256 truncated to 4 bytes.
const BALANCE_OF_SELECTOR: &str = "0x70a08231";

/// An ERC-20 contract this adapter queries `balanceOf` for.
///
/// Without an indexer there is no way to enumerate the tokens an address
/// holds, so the adapter probes a configured list and reports the non-zero
/// positions.
#[derive(Debug, Clone)]
pub struct TrackedToken {
    pub contract: String,
    pub symbol: String,
    pub name: String,
    pub precision: u32,
}

impl TrackedToken {
    pub fn new(
        contract: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        precision: u32,
    ) -> Self {
        Self {
            contract: contract.into(),
            symbol: symbol.into(),
            name: name.into(),
            precision,
        }
    }
}

/// Chain adapter for Ethereum-style chains, speaking JSON-RPC 2.0.
///
/// - `eth_getBalance` for the native coin.
/// - `eth_call` of `balanceOf(address)` against each tracked token contract.
///
/// Quantities come back as hex strings; they are parsed as u128 and carried
/// onward as base-unit decimal strings.
pub struct EvmAdapter {
    client: Client,
    chain_id: ChainId,
    rpc_url: String,
    tracked_tokens: Vec<TrackedToken>,
}

impl EvmAdapter {
    pub fn new(chain_id: ChainId, rpc_url: String, tracked_tokens: Vec<TrackedToken>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            chain_id,
            rpc_url,
            tracked_tokens,
        }
    }

    /// Ethereum mainnet with the default tracked-token set.
    pub fn ethereum_mainnet(rpc_url: String) -> Self {
        Self::new(
            ChainId::ethereum_mainnet(),
            rpc_url,
            Self::default_tracked_tokens(),
        )
    }

    /// The well-known mainnet ERC-20s probed by default.
    pub fn default_tracked_tokens() -> Vec<TrackedToken> {
        vec![
            TrackedToken::new("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USDC", "USD Coin", 6),
            TrackedToken::new("0xdac17f958d2ee523a2206206994597c13d831ec7", "USDT", "Tether", 6),
            TrackedToken::new("0x6b175474e89094c44da98b954eedeac495271d0f", "DAI", "Dai Stablecoin", 18),
            TrackedToken::new("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "WETH", "Wrapped Ether", 18),
            TrackedToken::new("0x2260fac5e5542a773aa44fbcfedf7c193bc2c599", "WBTC", "Wrapped Bitcoin", 8),
            TrackedToken::new("0x514910771af9ca656af840dff83e8264ecf986ca", "LINK", "Chainlink", 18),
            TrackedToken::new("0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", "UNI", "Uniswap", 18),
        ]
    }

    /// One JSON-RPC 2.0 call, returning the hex `result` string.
    async fn rpc_call(&self, method: &str, params: serde_json::Value) -> Result<String, CoreError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp: RpcResponse = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "EvmAdapter".into(),
                message: format!("Failed to parse {method} response: {e}"),
            })?;

        if let Some(err) = resp.error {
            return Err(CoreError::Api {
                provider: "EvmAdapter".into(),
                message: format!("{method} failed: {}", err.message),
            });
        }

        resp.result.ok_or_else(|| CoreError::Api {
            provider: "EvmAdapter".into(),
            message: format!("{method} returned no result"),
        })
    }

    /// Native-coin balance of an address, in base units (wei).
    async fn native_balance(&self, address: &str) -> Result<String, CoreError> {
        let result = self
            .rpc_call("eth_getBalance", json!([address, "latest"]))
            .await?;
        let wei = parse_hex_quantity(&result, address)?;
        Ok(wei.to_string())
    }

    /// ERC-20 balance of an address, in the token's base units.
    async fn token_balance(&self, contract: &str, address: &str) -> Result<String, CoreError> {
        // ABI-encode balanceOf(address): selector + address left-padded to 32 bytes
        let data = format!(
            "{BALANCE_OF_SELECTOR}{:0>64}",
            address.trim_start_matches("0x").to_lowercase()
        );
        let call = json!([{ "to": contract, "data": data }, "latest"]);
        let result = self.rpc_call("eth_call", call).await?;
        let units = parse_hex_quantity(&result, contract)?;
        Ok(units.to_string())
    }
}

/// Parse a JSON-RPC hex quantity ("0x1a2b…") into a u128.
/// An empty result ("0x") is zero.
fn parse_hex_quantity(hex: &str, context: &str) -> Result<u128, CoreError> {
    let digits = hex.trim().trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16).map_err(|_| CoreError::InvalidBalance {
        context: context.to_string(),
        value: hex.to_string(),
    })
}

fn is_hex_address(s: &str) -> bool {
    s.len() == 42
        && s.starts_with("0x")
        && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

// ── JSON-RPC response types ─────────────────────────────────────────

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    message: String,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ChainAdapter for EvmAdapter {
    fn name(&self) -> &str {
        "EvmAdapter"
    }

    fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    async fn get_account(&self, pubkey: &str) -> Result<AccountRecord, CoreError> {
        let address = pubkey.to_lowercase();
        if !is_hex_address(&address) {
            return Err(CoreError::AccountFetch {
                account: pubkey.to_string(),
                message: "not a 0x-prefixed 20-byte hex address".to_string(),
            });
        }

        let balance = self.native_balance(&address).await?;

        let mut tokens = Vec::new();
        for tracked in &self.tracked_tokens {
            match self.token_balance(&tracked.contract, &address).await {
                Ok(units) if units != "0" => {
                    tokens.push(TokenBalance {
                        contract: tracked.contract.clone(),
                        balance: units,
                        precision: tracked.precision,
                        symbol: tracked.symbol.clone(),
                        name: tracked.name.clone(),
                    });
                }
                Ok(_) => {} // zero balance, not held
                Err(e) => {
                    // One unresponsive contract must not sink the account
                    tracing::warn!(
                        contract = %tracked.contract,
                        error = %e,
                        "token balance query failed, skipping token"
                    );
                }
            }
        }

        Ok(AccountRecord::Evm(EvmAccount {
            chain_id: self.chain_id.clone(),
            balance,
            tokens,
        }))
    }
}
