use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use rust_decimal::Decimal;

use crate::models::asset::{Asset, AssetRegistry};
use crate::models::caip::AssetId;
use crate::models::market::MarketDataMap;
use crate::models::portfolio::Portfolio;

/// Fiat values are displayed to the cent.
const FIAT_DECIMAL_PLACES: u32 = 2;

/// `Decimal` carries at most 28 fractional digits; a precision beyond that
/// cannot be represented and values to zero like any other unknown precision.
const MAX_PRECISION: u32 = 28;

/// Parse a decimal string, coercing anything unparseable to zero.
/// Money math never propagates a parse error into the UI.
pub fn decimal_or_zero(s: &str) -> Decimal {
    s.trim().parse().unwrap_or(Decimal::ZERO)
}

/// Scale a base-unit integer string down by an asset's precision.
/// `from_base_unit("150000000", 8)` → `1.5`. Exact; no floats involved.
pub fn from_base_unit(base_units: &str, precision: u32) -> Decimal {
    if precision > MAX_PRECISION {
        return Decimal::ZERO;
    }
    decimal_or_zero(base_units)
        .checked_mul(Decimal::new(1, precision))
        .unwrap_or(Decimal::ZERO)
}

/// Derived read views over the portfolio: balances, fiat values, held
/// assets. All arithmetic is `Decimal` — native floats never touch money.
///
/// `held_asset_ids` is memoized by set-equality rather than by input
/// identity: recomputing the same ids in a different order returns the
/// previously memoized vector, so downstream consumers comparing outputs
/// see a stable value.
pub struct ValuationService {
    held_cache: Mutex<Option<Vec<AssetId>>>,
}

impl ValuationService {
    pub fn new() -> Self {
        Self {
            held_cache: Mutex::new(None),
        }
    }

    /// All asset ids currently holding a recorded balance.
    pub fn held_asset_ids(&self, portfolio: &Portfolio) -> Vec<AssetId> {
        let current = portfolio.balances.ids.clone();
        let mut cache = self.held_cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = cache.as_ref() {
            if same_id_set(previous, &current) {
                return previous.clone();
            }
        }
        *cache = Some(current.clone());
        current
    }

    /// Base-unit balance of an asset; "0" when the asset has no entry.
    pub fn balance_of(&self, portfolio: &Portfolio, asset_id: &AssetId) -> String {
        portfolio
            .balances
            .get(asset_id)
            .unwrap_or("0")
            .to_string()
    }

    /// Fiat value of one asset position, rounded to the cent.
    ///
    /// `(balance scaled by precision) × USD price`. Unknown price, unknown
    /// precision, or an unparseable balance all value to zero — a data gap
    /// renders as an empty position, never as an error.
    pub fn fiat_balance(
        &self,
        portfolio: &Portfolio,
        market_data: &MarketDataMap,
        registry: &AssetRegistry,
        asset_id: &AssetId,
    ) -> Decimal {
        let Some(balance) = portfolio.balances.get(asset_id) else {
            return Decimal::ZERO;
        };
        let Some(precision) = registry.precision_of(asset_id) else {
            return Decimal::ZERO;
        };
        let Some(market) = market_data.get(asset_id) else {
            return Decimal::ZERO;
        };

        from_base_unit(balance, precision)
            .checked_mul(market.price)
            .unwrap_or(Decimal::ZERO)
            .round_dp(FIAT_DECIMAL_PLACES)
    }

    /// Total fiat value across all held assets, rounded to the cent.
    /// Assets lacking market data contribute zero.
    pub fn total_fiat_balance(
        &self,
        portfolio: &Portfolio,
        market_data: &MarketDataMap,
        registry: &AssetRegistry,
    ) -> Decimal {
        portfolio
            .balances
            .ids
            .iter()
            .map(|asset_id| self.fiat_balance(portfolio, market_data, registry, asset_id))
            .fold(Decimal::ZERO, |acc, v| {
                acc.checked_add(v).unwrap_or(acc)
            })
            .round_dp(FIAT_DECIMAL_PLACES)
    }

    /// Metadata records for every held asset the registry knows about.
    pub fn held_assets(
        &self,
        portfolio: &Portfolio,
        registry: &AssetRegistry,
    ) -> HashMap<AssetId, Asset> {
        portfolio
            .balances
            .ids
            .iter()
            .filter_map(|asset_id| {
                registry
                    .get(asset_id)
                    .map(|asset| (asset_id.clone(), asset.clone()))
            })
            .collect()
    }
}

/// Order-insensitive id comparison.
fn same_id_set(a: &[AssetId], b: &[AssetId]) -> bool {
    a.len() == b.len() && {
        let set: HashSet<&AssetId> = a.iter().collect();
        b.iter().all(|id| set.contains(id))
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
