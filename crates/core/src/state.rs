use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::models::market::MarketDataMap;
use crate::models::portfolio::Portfolio;

/// Owner of all shared mutable state: the portfolio index and the market
/// data map. Both are only ever replaced wholesale — readers never observe
/// a half-updated value.
///
/// Sync cycles race: a slow response from an old cycle may settle after a
/// newer cycle has already committed. Each cycle therefore takes a number
/// from `begin_cycle`, and `commit` rejects any cycle older than the last
/// one committed, so stale data cannot overwrite fresh data.
pub struct PortfolioStore {
    inner: RwLock<StoreInner>,
    next_cycle: AtomicU64,
}

struct StoreInner {
    portfolio: Portfolio,
    market_data: MarketDataMap,
    committed_cycle: u64,
    last_synced: Option<DateTime<Utc>>,
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                portfolio: Portfolio::new(),
                market_data: MarketDataMap::new(),
                committed_cycle: 0,
                last_synced: None,
            }),
            next_cycle: AtomicU64::new(0),
        }
    }

    /// Start a new fetch cycle and get its number. Cycle numbers are
    /// strictly increasing across the store's lifetime.
    pub fn begin_cycle(&self) -> u64 {
        self.next_cycle.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the stored portfolio with the result of `cycle`.
    ///
    /// Returns `false` (and drops the portfolio) when a younger cycle has
    /// already committed or the store was cleared after this cycle began.
    pub fn commit(&self, cycle: u64, portfolio: Portfolio) -> bool {
        let mut inner = self.write();
        if cycle < inner.committed_cycle {
            return false;
        }
        inner.committed_cycle = cycle;
        inner.portfolio = portfolio;
        inner.last_synced = Some(Utc::now());
        true
    }

    /// Reset to an empty portfolio (wallet disconnect).
    ///
    /// Also advances the committed cycle past every cycle started so far,
    /// so an in-flight sync from before the disconnect cannot resurrect
    /// the old accounts.
    pub fn clear(&self) {
        let fence = self.begin_cycle();
        let mut inner = self.write();
        inner.committed_cycle = fence;
        inner.portfolio = Portfolio::new();
        inner.market_data = MarketDataMap::new();
        inner.last_synced = None;
    }

    /// Read the portfolio without cloning it.
    pub fn with_portfolio<R>(&self, f: impl FnOnce(&Portfolio) -> R) -> R {
        f(&self.read().portfolio)
    }

    /// Clone the current portfolio.
    pub fn portfolio(&self) -> Portfolio {
        self.read().portfolio.clone()
    }

    /// Replace the market data map wholesale.
    pub fn set_market_data(&self, market_data: MarketDataMap) {
        self.write().market_data = market_data;
    }

    /// Read the market data map without cloning it.
    pub fn with_market_data<R>(&self, f: impl FnOnce(&MarketDataMap) -> R) -> R {
        f(&self.read().market_data)
    }

    /// Read portfolio and market data under one lock acquisition.
    pub fn with_state<R>(&self, f: impl FnOnce(&Portfolio, &MarketDataMap) -> R) -> R {
        let inner = self.read();
        f(&inner.portfolio, &inner.market_data)
    }

    /// When the last successful sync committed, if any.
    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.read().last_synced
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for PortfolioStore {
    fn default() -> Self {
        Self::new()
    }
}
