use std::collections::HashMap;

use futures::future::join_all;

use crate::errors::CoreError;
use crate::models::account::AccountRecord;
use crate::models::caip::{AccountId, ChainId};
use crate::models::portfolio::Portfolio;
use crate::providers::registry::ChainAdapterRegistry;
use crate::state::PortfolioStore;
use super::portfolio_service::PortfolioService;

/// The settled result of one account fetch. Failures stay visible here —
/// the portfolio excludes them, but the caller can tell a failed chain
/// apart from a chain with zero accounts.
#[derive(Debug)]
pub struct AccountFetchOutcome {
    pub account_id: AccountId,
    pub result: Result<AccountRecord, CoreError>,
}

impl AccountFetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// What one sync cycle did: every per-account outcome, plus whether the
/// derived portfolio actually replaced the stored one.
#[derive(Debug)]
pub struct SyncReport {
    pub cycle: u64,
    /// False when a younger cycle committed first and this cycle's result
    /// was dropped.
    pub committed: bool,
    pub outcomes: Vec<AccountFetchOutcome>,
}

impl SyncReport {
    pub fn fetched(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.fetched()
    }
}

/// Orchestrates one portfolio fetch cycle: fan out one request per
/// (chain, public key) pair, wait for every request to settle, normalize
/// the successes, commit the result atomically.
pub struct SyncService {
    portfolio_service: PortfolioService,
}

impl SyncService {
    pub fn new() -> Self {
        Self {
            portfolio_service: PortfolioService::new(),
        }
    }

    /// Run one sync cycle.
    ///
    /// - An empty input commits an empty portfolio without touching any
    ///   adapter.
    /// - All account requests run concurrently; an individual failure is
    ///   logged, reported in the outcome list, and excluded from the
    ///   portfolio — it never aborts sibling requests.
    /// - The portfolio replaces the stored one only if no younger cycle
    ///   committed while this one was in flight.
    pub async fn sync(
        &self,
        registry: &ChainAdapterRegistry,
        store: &PortfolioStore,
        pubkeys_by_chain: &HashMap<ChainId, Vec<String>>,
    ) -> SyncReport {
        let cycle = store.begin_cycle();

        // Flatten to (chain, pubkey) pairs. Chains are sorted so the
        // request order — and with it the normalized index — is the same
        // for the same input, whatever the map's iteration order.
        let mut chains: Vec<(&ChainId, &Vec<String>)> = pubkeys_by_chain.iter().collect();
        chains.sort_by_key(|(chain_id, _)| chain_id.to_string());
        let pairs: Vec<(&ChainId, &String)> = chains
            .iter()
            .flat_map(|(chain_id, pubkeys)| pubkeys.iter().map(move |pk| (*chain_id, pk)))
            .collect();

        if pairs.is_empty() {
            let committed = store.commit(cycle, Portfolio::new());
            return SyncReport {
                cycle,
                committed,
                outcomes: Vec::new(),
            };
        }

        let requests = pairs.into_iter().map(|(chain_id, pubkey)| async move {
            let account_id = AccountId::new(chain_id, pubkey);
            let result = match registry.get(chain_id) {
                Some(adapter) => adapter.get_account(pubkey).await,
                None => Err(CoreError::NoAdapter(chain_id.to_string())),
            };
            AccountFetchOutcome { account_id, result }
        });

        // Settle-all: every request completes, success or failure
        let outcomes = join_all(requests).await;

        let mut fetched: Vec<(AccountId, AccountRecord)> = Vec::new();
        for outcome in &outcomes {
            match &outcome.result {
                Ok(record) => fetched.push((outcome.account_id.clone(), record.clone())),
                Err(e) => {
                    tracing::warn!(
                        account = %outcome.account_id,
                        error = %e,
                        "account fetch failed, excluded from portfolio"
                    );
                }
            }
        }

        let portfolio = self.portfolio_service.accounts_to_portfolio(&fetched);
        let committed = store.commit(cycle, portfolio);
        if !committed {
            tracing::warn!(cycle, "sync cycle superseded, result dropped");
        }

        SyncReport {
            cycle,
            committed,
            outcomes,
        }
    }

    /// The normalizer, exposed for callers that already hold raw records.
    pub fn portfolio_service(&self) -> &PortfolioService {
        &self.portfolio_service
    }
}

impl Default for SyncService {
    fn default() -> Self {
        Self::new()
    }
}
