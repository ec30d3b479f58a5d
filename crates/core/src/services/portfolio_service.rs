use crate::models::account::{AccountRecord, UtxoAccount};
use crate::models::asset::Asset;
use crate::models::caip::{AccountId, AssetId};
use crate::models::portfolio::Portfolio;

/// Normalizes raw per-chain account records into the unified portfolio
/// index.
///
/// Pure business logic — no I/O, no API calls. Easy to test.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Convert an ordered list of fetched accounts into a `Portfolio`.
    ///
    /// Deterministic: the same input always yields a structurally equal
    /// Portfolio (the orchestrator hands records over in request order).
    ///
    /// Dispatch on the record variant is exhaustive — a chain kind without
    /// a branch here does not compile.
    pub fn accounts_to_portfolio(&self, accounts: &[(AccountId, AccountRecord)]) -> Portfolio {
        let mut portfolio = Portfolio::new();

        for (account_id, record) in accounts {
            match record {
                AccountRecord::Evm(evm) => {
                    let native = evm.chain_id.native_asset_id();
                    portfolio.balances.accumulate(&native, &evm.balance);
                    portfolio.accounts.push_asset(account_id, native);

                    for token in &evm.tokens {
                        let asset_id = AssetId::erc20(&evm.chain_id, &token.contract);
                        portfolio.balances.accumulate(&asset_id, &token.balance);
                        portfolio.accounts.push_asset(account_id, asset_id);
                    }
                }
                AccountRecord::Utxo(utxo) => {
                    let native = utxo.chain_id.native_asset_id();
                    let total = sum_address_balances(utxo);
                    portfolio.balances.accumulate(&native, &total.to_string());
                    portfolio.accounts.push_asset(account_id, native);
                }
            }
        }

        portfolio
    }

    /// Asset metadata carried inside the raw records (token symbol, name,
    /// precision reported by the chain data source). The facade registers
    /// these so valuation knows the precision of tokens the seed list
    /// doesn't cover.
    pub fn discovered_assets(&self, accounts: &[(AccountId, AccountRecord)]) -> Vec<Asset> {
        let mut assets = Vec::new();
        for (_, record) in accounts {
            if let AccountRecord::Evm(evm) = record {
                for token in &evm.tokens {
                    assets.push(Asset::new(
                        AssetId::erc20(&evm.chain_id, &token.contract),
                        &token.symbol,
                        &token.name,
                        token.precision,
                    ));
                }
            }
        }
        assets
    }
}

/// Sum the derived-address balances of a UTXO account into one base-unit
/// total. An absent or unparseable address balance counts as zero.
fn sum_address_balances(account: &UtxoAccount) -> u128 {
    account
        .addresses
        .iter()
        .map(|a| a.balance.trim().parse::<u128>().unwrap_or(0))
        .fold(0u128, u128::saturating_add)
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
