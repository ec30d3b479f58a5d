use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::caip::AssetId;

/// Market data for one asset, denominated in USD.
///
/// Prices are `Decimal`, not floats — fiat valuations must round exactly
/// at cent level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketData {
    /// Current USD price per whole unit of the asset.
    pub price: Decimal,

    /// 24h price change in percent, when the provider reports it.
    pub change_percent_24h: Option<Decimal>,

    /// Market capitalization in USD, when the provider reports it.
    pub market_cap: Option<Decimal>,
}

impl MarketData {
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            change_percent_24h: None,
            market_cap: None,
        }
    }
}

/// All known market data, keyed by asset id. Replaced wholesale on refresh.
pub type MarketDataMap = HashMap<AssetId, MarketData>;
