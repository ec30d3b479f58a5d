use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::caip::{AccountId, AssetId};

/// Normalized account index: which assets each account holds.
///
/// `ids` preserves insertion order so iteration is stable between reads;
/// the order itself carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioAccounts {
    /// All account ids, in the order they were first recorded.
    pub ids: Vec<AccountId>,

    /// Ordered list of asset ids held by each account.
    pub by_id: HashMap<AccountId, Vec<AssetId>>,
}

impl PortfolioAccounts {
    /// Record an account, keeping `ids` free of duplicates.
    pub fn upsert(&mut self, account_id: &AccountId) {
        if !self.by_id.contains_key(account_id) {
            self.ids.push(account_id.clone());
            self.by_id.insert(account_id.clone(), Vec::new());
        }
    }

    /// Append an asset to an account's list unless already present.
    /// Implicitly records the account first if needed.
    pub fn push_asset(&mut self, account_id: &AccountId, asset_id: AssetId) {
        self.upsert(account_id);
        if let Some(assets) = self.by_id.get_mut(account_id) {
            if !assets.contains(&asset_id) {
                assets.push(asset_id);
            }
        }
    }

    /// The assets held by an account, empty if the account is unknown.
    pub fn assets_of(&self, account_id: &AccountId) -> &[AssetId] {
        self.by_id.get(account_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Normalized balance index: base-unit integer balance per asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioBalances {
    /// All asset ids with a recorded balance, in first-seen order.
    pub ids: Vec<AssetId>,

    /// Balance per asset as a base-unit integer string.
    pub by_id: HashMap<AssetId, String>,
}

impl PortfolioBalances {
    /// Add `amount` (a base-unit integer string, coerced to 0 if
    /// unparseable) to an asset's balance, creating the entry if needed.
    /// Accumulation is what merges the same asset held by several accounts
    /// into one total.
    pub fn accumulate(&mut self, asset_id: &AssetId, amount: &str) {
        let incoming: u128 = amount.trim().parse().unwrap_or(0);
        match self.by_id.get_mut(asset_id) {
            Some(existing) => {
                let current: u128 = existing.parse().unwrap_or(0);
                *existing = current.saturating_add(incoming).to_string();
            }
            None => {
                self.ids.push(asset_id.clone());
                self.by_id.insert(asset_id.clone(), incoming.to_string());
            }
        }
    }

    /// Base-unit balance for an asset; `None` if no entry was recorded.
    pub fn get(&self, asset_id: &AssetId) -> Option<&str> {
        self.by_id.get(asset_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// The unified portfolio index: accounts plus balances.
///
/// Invariant: every asset id appearing in any account's list also has an
/// entry in `balances` (the balance may be "0" but it exists). The
/// normalizer upholds this by recording a balance for exactly the assets it
/// appends to account lists.
///
/// A Portfolio is recomputed wholesale each sync cycle and swapped in
/// atomically through the store — it is never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub accounts: PortfolioAccounts,
    pub balances: PortfolioBalances,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.balances.is_empty()
    }
}
