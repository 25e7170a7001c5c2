//! Market identifiers and per-venue market metadata.

use rust_decimal::Decimal;

use super::currency::Currency;

/// A market identifier: the concatenation `TRADE||BASE` with no
/// separator, e.g. `ETHBTC` for trading ETH against a BTC quote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Market {
    trade: Currency,
    base: Currency,
}

impl Market {
    pub fn new(trade: Currency, base: Currency) -> Self {
        Self { trade, base }
    }

    pub fn trade(&self) -> &Currency {
        &self.trade
    }

    pub fn base(&self) -> &Currency {
        &self.base
    }

    /// The venue-facing market label, `TRADE||BASE` concatenated.
    pub fn label(&self) -> String {
        format!("{}{}", self.trade, self.base)
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-venue, per-market static metadata: fees, precisions, minima.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketInfo {
    pub trade_fee: Decimal,
    pub rate_precision: u32,
    pub volume_precision: u32,
    pub min_trade_volume: Decimal,
    pub min_order_value_btc: Option<Decimal>,
    pub min_order_value_eth: Option<Decimal>,
}
