//! The exchange adapter contract: every venue (Binance-like, Kraken-like)
//! implements this trait, so the scanner and workers never know which
//! venue they're talking to.

use std::collections::HashSet;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::core::domain::{Currency, Market, MarketInfo, Side, Wallet};
use crate::error::Result;

/// Unique identifier for a placed order, as returned by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A venue's report on the current state of a placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStatus {
    pub order_id: OrderId,
    pub filled_qty: Decimal,
    pub quantity_remaining: Decimal,
    pub is_open: bool,
}

/// Polymorphic contract for a single trading venue. Implementations own
/// their own signing, rate limiting, and nonce bookkeeping.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Stable identifier used in logs and persisted rows (e.g. "binance").
    fn name(&self) -> &'static str;

    async fn get_balances(&self) -> Result<Wallet>;

    async fn get_market_info(
        &self,
        markets: &[Market],
    ) -> Result<std::collections::HashMap<Market, MarketInfo>>;

    async fn place_order(
        &self,
        market: &Market,
        rate: Decimal,
        volume: Decimal,
        side: Side,
    ) -> Result<OrderId>;

    async fn cancel_order(&self, order_id: &OrderId, market: &Market) -> Result<()>;

    async fn get_order_data(&self, order_id: &OrderId, market: &Market) -> Result<OrderStatus>;

    /// The full set of trade/base pairs this venue currently lists,
    /// intersected against the selected currency set by the route builder.
    async fn discover_pairs(&self) -> Result<HashSet<(Currency, Currency)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_displays_its_inner_string() {
        let id = OrderId::new("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(id.as_str(), "abc123");
    }
}
