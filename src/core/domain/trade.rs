//! The unit of work handed from the scanner to an execution worker.

use rust_decimal::Decimal;

use super::market::Market;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposite side, used when walking a rate "inward" while chasing
    /// a fill: a BUY walks its rate up, a SELL walks it down.
    pub fn rate_walk_sign(self) -> i32 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

/// A conditional second leg, attached to a [`TradeDescriptor`] for
/// multi-leg and cross routes. Its volume is computed from the primary
/// leg's proceeds only once the primary leg's retry loop terminates.
#[derive(Debug, Clone)]
pub struct FollowUp {
    pub side: Side,
    pub market: Market,
    pub rate: Decimal,
}

/// Everything a worker needs to execute one leg of a route.
#[derive(Debug, Clone)]
pub struct TradeDescriptor {
    pub exchange: String,
    pub market: Market,
    pub side: Side,
    pub rate: Decimal,
    pub volume: Decimal,
    pub min_order_value: Decimal,
    pub rate_precision: u32,
    pub volume_precision: u32,
    pub follow_up: Option<FollowUp>,
}

impl TradeDescriptor {
    pub fn order_value(&self) -> Decimal {
        self.rate * self.volume
    }
}
