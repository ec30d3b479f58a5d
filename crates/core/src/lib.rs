pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod state;

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use models::account::AccountRecord;
use models::asset::{Asset, AssetRegistry};
use models::caip::{AccountId, AssetId, ChainId};
use models::portfolio::Portfolio;
use models::settings::Settings;
use providers::registry::ChainAdapterRegistry;
use providers::traits::{ChainAdapter, MarketDataProvider};
use services::action_service::{
    AssetAction, AssetActionService, IntentDispatcher, UiIntent, WalletConnection,
};
use services::market_service::MarketService;
use services::sync_service::{SyncReport, SyncService};
use services::valuation_service::ValuationService;
use state::PortfolioStore;

/// Main entry point for the wallet-portfolio core library.
/// Owns the portfolio state and all services needed to operate on it.
///
/// All methods take `&self`: state lives behind the store's atomic-replace
/// discipline, so overlapping sync cycles are safe — the younger cycle's
/// result wins and a superseded cycle's commit is dropped.
#[must_use]
pub struct PortfolioTracker {
    settings: Settings,
    store: PortfolioStore,
    adapters: ChainAdapterRegistry,
    asset_registry: RwLock<AssetRegistry>,
    sync_service: SyncService,
    market_service: MarketService,
    valuation_service: ValuationService,
    action_service: AssetActionService,
    /// Most recent sync request, replayed when connectivity returns.
    last_request: RwLock<Option<HashMap<ChainId, Vec<String>>>>,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (accounts, assets) = self
            .store
            .with_portfolio(|p| (p.accounts.len(), p.balances.len()));
        f.debug_struct("PortfolioTracker")
            .field("accounts", &accounts)
            .field("assets", &assets)
            .field("last_synced", &self.store.last_synced())
            .finish()
    }
}

impl PortfolioTracker {
    /// Create a tracker with default settings and the default mainnet
    /// adapters and market data providers.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create a tracker with custom settings (endpoints, display currency).
    pub fn with_settings(settings: Settings) -> Self {
        let adapters = ChainAdapterRegistry::new_with_defaults(&settings);
        let market_service = MarketService::new_with_defaults();
        let asset_registry = AssetRegistry::with_defaults();
        Self::build(settings, adapters, market_service, asset_registry)
    }

    /// Create a tracker from explicit components. This is the seam used by
    /// tests and by embedders bringing their own adapters.
    pub fn with_components(
        settings: Settings,
        adapters: ChainAdapterRegistry,
        market_service: MarketService,
        asset_registry: AssetRegistry,
    ) -> Self {
        Self::build(settings, adapters, market_service, asset_registry)
    }

    // ── Syncing ─────────────────────────────────────────────────────

    /// Run one fetch cycle for the given public keys.
    ///
    /// One concurrent request per (chain, public key) pair; all requests
    /// settle; failures are logged, reported in the returned
    /// [`SyncReport`], and excluded from the portfolio. On success the
    /// derived portfolio atomically replaces the stored one (unless a
    /// younger cycle got there first).
    ///
    /// Token metadata discovered in the raw records is registered so
    /// valuation knows precisions the seed list doesn't cover.
    pub async fn sync_accounts(
        &self,
        pubkeys_by_chain: HashMap<ChainId, Vec<String>>,
    ) -> SyncReport {
        {
            let mut last = self
                .last_request
                .write()
                .unwrap_or_else(|e| e.into_inner());
            *last = Some(pubkeys_by_chain.clone());
        }

        let report = self
            .sync_service
            .sync(&self.adapters, &self.store, &pubkeys_by_chain)
            .await;

        let fetched: Vec<(AccountId, AccountRecord)> = report
            .outcomes
            .iter()
            .filter_map(|o| {
                o.result
                    .as_ref()
                    .ok()
                    .map(|record| (o.account_id.clone(), record.clone()))
            })
            .collect();
        let discovered = self
            .sync_service
            .portfolio_service()
            .discovered_assets(&fetched);
        if !discovered.is_empty() {
            let mut registry = self
                .asset_registry
                .write()
                .unwrap_or_else(|e| e.into_inner());
            for asset in discovered {
                registry.register_if_absent(asset);
            }
        }

        report
    }

    /// Re-run the most recent sync request, if there was one.
    pub async fn resync(&self) -> Option<SyncReport> {
        let request = {
            let last = self
                .last_request
                .read()
                .unwrap_or_else(|e| e.into_inner());
            last.clone()
        }?;
        Some(self.sync_accounts(request).await)
    }

    /// Connectivity-regained hook: refetch so a portfolio that went stale
    /// while offline catches up.
    pub async fn handle_network_online(&self) -> Option<SyncReport> {
        tracing::info!("network connectivity regained, refetching accounts");
        self.resync().await
    }

    /// Wallet disconnect: drop the portfolio, market data, and remembered
    /// request. In-flight sync cycles from before the disconnect can no
    /// longer commit.
    pub fn disconnect(&self) {
        self.store.clear();
        let mut last = self
            .last_request
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *last = None;
    }

    // ── Market data ─────────────────────────────────────────────────

    /// Fetch USD market data for every held asset with known metadata and
    /// replace the stored map wholesale. Assets no provider can quote are
    /// omitted and value to zero.
    pub async fn refresh_market_data(&self) {
        let assets: Vec<Asset> = {
            let registry = self
                .asset_registry
                .read()
                .unwrap_or_else(|e| e.into_inner());
            self.store.with_portfolio(|portfolio| {
                self.valuation_service
                    .held_assets(portfolio, &registry)
                    .into_values()
                    .collect()
            })
        };

        let market_data = self.market_service.fetch_for_assets(&assets).await;
        self.store.set_market_data(market_data);
    }

    // ── Derived views ───────────────────────────────────────────────

    /// All asset ids currently holding a balance. Stable output: the same
    /// set recomputed in a different order returns the memoized vector.
    #[must_use]
    pub fn held_asset_ids(&self) -> Vec<AssetId> {
        self.store
            .with_portfolio(|p| self.valuation_service.held_asset_ids(p))
    }

    /// Base-unit balance of an asset, "0" when not held.
    #[must_use]
    pub fn balance_of(&self, asset_id: &AssetId) -> String {
        self.store
            .with_portfolio(|p| self.valuation_service.balance_of(p, asset_id))
    }

    /// Fiat value of one asset position, rounded to the cent.
    /// Zero when price or precision is unknown.
    #[must_use]
    pub fn fiat_balance(&self, asset_id: &AssetId) -> Decimal {
        let registry = self
            .asset_registry
            .read()
            .unwrap_or_else(|e| e.into_inner());
        self.store.with_state(|portfolio, market_data| {
            self.valuation_service
                .fiat_balance(portfolio, market_data, &registry, asset_id)
        })
    }

    /// Total fiat value of the portfolio, rounded to the cent.
    #[must_use]
    pub fn total_fiat_balance(&self) -> Decimal {
        let registry = self
            .asset_registry
            .read()
            .unwrap_or_else(|e| e.into_inner());
        self.store.with_state(|portfolio, market_data| {
            self.valuation_service
                .total_fiat_balance(portfolio, market_data, &registry)
        })
    }

    /// Metadata for every held asset the registry knows.
    #[must_use]
    pub fn held_assets(&self) -> HashMap<AssetId, Asset> {
        let registry = self
            .asset_registry
            .read()
            .unwrap_or_else(|e| e.into_inner());
        self.store
            .with_portfolio(|p| self.valuation_service.held_assets(p, &registry))
    }

    /// All synced account ids, in stable order.
    #[must_use]
    pub fn account_ids(&self) -> Vec<AccountId> {
        self.store.with_portfolio(|p| p.accounts.ids.clone())
    }

    /// Snapshot of the whole portfolio index.
    #[must_use]
    pub fn portfolio(&self) -> Portfolio {
        self.store.portfolio()
    }

    /// When the last successful sync committed, if any.
    #[must_use]
    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.store.last_synced()
    }

    // ── Asset actions ───────────────────────────────────────────────

    /// Activate the send affordance for an asset. Opens the send modal
    /// when a wallet is connected, the connection prompt otherwise.
    pub fn send(
        &self,
        wallet: &dyn WalletConnection,
        dispatcher: &dyn IntentDispatcher,
        asset_id: &AssetId,
        account_id: Option<&AccountId>,
    ) -> UiIntent {
        self.action_service
            .activate(wallet, dispatcher, AssetAction::Send, asset_id, account_id)
    }

    /// Activate the receive affordance for an asset.
    pub fn receive(
        &self,
        wallet: &dyn WalletConnection,
        dispatcher: &dyn IntentDispatcher,
        asset_id: &AssetId,
        account_id: Option<&AccountId>,
    ) -> UiIntent {
        self.action_service.activate(
            wallet,
            dispatcher,
            AssetAction::Receive,
            asset_id,
            account_id,
        )
    }

    // ── Registries & settings ───────────────────────────────────────

    /// Register an additional chain adapter.
    pub fn register_adapter(&mut self, adapter: Box<dyn ChainAdapter>) {
        self.adapters.register(adapter);
    }

    /// Register an additional market data provider (fallback order).
    pub fn register_market_provider(&mut self, provider: Box<dyn MarketDataProvider>) {
        self.market_service.register(provider);
    }

    /// Insert or replace asset metadata.
    pub fn register_asset(&self, asset: Asset) {
        self.asset_registry
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .register(asset);
    }

    /// Metadata for one asset, if known.
    #[must_use]
    pub fn asset(&self, asset_id: &AssetId) -> Option<Asset> {
        self.asset_registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(asset_id)
            .cloned()
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(
        settings: Settings,
        adapters: ChainAdapterRegistry,
        market_service: MarketService,
        asset_registry: AssetRegistry,
    ) -> Self {
        Self {
            settings,
            store: PortfolioStore::new(),
            adapters,
            asset_registry: RwLock::new(asset_registry),
            sync_service: SyncService::new(),
            market_service,
            valuation_service: ValuationService::new(),
            action_service: AssetActionService::new(),
            last_request: RwLock::new(None),
        }
    }
}

impl Default for PortfolioTracker {
    fn default() -> Self {
        Self::new()
    }
}
