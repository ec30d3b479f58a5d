use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::account::{AccountRecord, AddressBalance, UtxoAccount};
use crate::models::caip::ChainId;
use super::traits::ChainAdapter;

/// Chain adapter for Bitcoin-style chains, speaking the Blockbook REST API.
///
/// One `GET /api/v2/xpub/{xpub}` call returns the account's total together
/// with every derived address that has ever been used. The per-address
/// balances are what the normalizer sums — the endpoint's own total is
/// ignored so UTXO accounts go through the same summing path as everything
/// else.
pub struct BitcoinAdapter {
    client: Client,
    chain_id: ChainId,
    base_url: String,
}

impl BitcoinAdapter {
    pub fn new(chain_id: ChainId, base_url: String) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            chain_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Bitcoin mainnet against a Blockbook instance.
    pub fn bitcoin_mainnet(base_url: String) -> Self {
        Self::new(ChainId::bitcoin_mainnet(), base_url)
    }
}

// ── Blockbook API response types ────────────────────────────────────

#[derive(Deserialize)]
struct XpubResponse {
    /// Derived addresses appear as "tokens" of type XPUBAddress.
    #[serde(default)]
    tokens: Vec<XpubToken>,
}

#[derive(Deserialize)]
struct XpubToken {
    #[serde(rename = "type")]
    kind: String,
    /// The derived address itself.
    name: String,
    balance: Option<String>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ChainAdapter for BitcoinAdapter {
    fn name(&self) -> &str {
        "BitcoinAdapter"
    }

    fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    async fn get_account(&self, pubkey: &str) -> Result<AccountRecord, CoreError> {
        let url = format!(
            "{}/api/v2/xpub/{pubkey}?details=tokenBalances&tokens=used",
            self.base_url
        );

        let resp: XpubResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "BitcoinAdapter".into(),
                message: format!("Failed to parse xpub response: {e}"),
            })?;

        let addresses = resp
            .tokens
            .into_iter()
            .filter(|t| t.kind == "XPUBAddress")
            .map(|t| AddressBalance {
                address: t.name,
                balance: t.balance.unwrap_or_else(|| "0".to_string()),
            })
            .collect();

        Ok(AccountRecord::Utxo(UtxoAccount {
            chain_id: self.chain_id.clone(),
            addresses,
        }))
    }
}
