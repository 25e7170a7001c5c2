//! Route shapes: direct, multi-leg (3-leg bridge), and cross (4-leg).

use super::currency::Currency;
use super::market::Market;

/// A single candidate arbitrage route. The route builder enumerates all
/// of these up front; the scanner re-evaluates each one every tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// The same market traded directly on two venues.
    Direct { market: Market },
    /// Buy `trade` against `buy_base` on one venue, sell `trade` against
    /// `sell_base` on the other, then swap `sell_base` back into
    /// `buy_base` via `cross_pair` on the selling venue.
    MultiLeg {
        buy_market: Market,
        sell_market: Market,
        cross_pair: Market,
        trade: Currency,
        buy_base: Currency,
        sell_base: Currency,
    },
    /// Sell `trade_x` for `trade_y` on one venue (via `base`) while
    /// mirroring the opposite direction on the other.
    Cross {
        trade_x: Currency,
        trade_y: Currency,
        base: Currency,
        market_x: Market,
        market_y: Market,
    },
}

impl Route {
    pub fn direct(market: Market) -> Self {
        Self::Direct { market }
    }

    /// Build a multi-leg route, validating the field relationships the
    /// domain demands: `sell_base != buy_base` and `cross_pair` is exactly
    /// `sell_base||buy_base`.
    pub fn multi_leg(
        trade: Currency,
        buy_base: Currency,
        sell_base: Currency,
    ) -> Option<Self> {
        if buy_base == sell_base {
            return None;
        }
        let buy_market = Market::new(trade.clone(), buy_base.clone());
        let sell_market = Market::new(trade.clone(), sell_base.clone());
        let cross_pair = Market::new(sell_base.clone(), buy_base.clone());
        Some(Self::MultiLeg {
            buy_market,
            sell_market,
            cross_pair,
            trade,
            buy_base,
            sell_base,
        })
    }

    /// Build a cross route, validating `trade_x != trade_y` and
    /// `base` distinct from both.
    pub fn cross(trade_x: Currency, trade_y: Currency, base: Currency) -> Option<Self> {
        if trade_x == trade_y || base == trade_x || base == trade_y {
            return None;
        }
        let market_x = Market::new(trade_x.clone(), base.clone());
        let market_y = Market::new(trade_y.clone(), base.clone());
        Some(Self::Cross {
            trade_x,
            trade_y,
            base,
            market_x,
            market_y,
        })
    }

    /// Number of legs this route family executes (used for the dynamic
    /// threshold's fee product).
    pub fn leg_count(&self) -> usize {
        match self {
            Self::Direct { .. } => 2,
            Self::MultiLeg { .. } => 3,
            Self::Cross { .. } => 4,
        }
    }

    /// The markets touched by this route, in a stable order.
    pub fn markets(&self) -> Vec<&Market> {
        match self {
            Self::Direct { market } => vec![market],
            Self::MultiLeg {
                buy_market,
                sell_market,
                cross_pair,
                ..
            } => vec![buy_market, sell_market, cross_pair],
            Self::Cross {
                market_x, market_y, ..
            } => vec![market_x, market_y],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cur(s: &str) -> Currency {
        Currency::new(s)
    }

    #[test]
    fn direct_route_has_two_legs() {
        let r = Route::direct(Market::new(cur("ETH"), cur("BTC")));
        assert_eq!(r.leg_count(), 2);
        assert_eq!(r.markets().len(), 1);
    }

    #[test]
    fn multi_leg_rejects_equal_bases() {
        assert!(Route::multi_leg(cur("ETH"), cur("BTC"), cur("BTC")).is_none());
    }

    #[test]
    fn multi_leg_derives_cross_pair_as_sell_base_buy_base() {
        let r = Route::multi_leg(cur("ETH"), cur("BTC"), cur("USDT")).unwrap();
        match r {
            Route::MultiLeg { cross_pair, .. } => {
                assert_eq!(cross_pair, Market::new(cur("USDT"), cur("BTC")));
            }
            _ => panic!("expected MultiLeg"),
        }
    }

    #[test]
    fn multi_leg_has_three_legs() {
        let r = Route::multi_leg(cur("ETH"), cur("BTC"), cur("USDT")).unwrap();
        assert_eq!(r.leg_count(), 3);
        assert_eq!(r.markets().len(), 3);
    }

    #[test]
    fn cross_rejects_equal_trade_currencies() {
        assert!(Route::cross(cur("ETH"), cur("ETH"), cur("BTC")).is_none());
    }

    #[test]
    fn cross_rejects_base_equal_to_a_trade_currency() {
        assert!(Route::cross(cur("ETH"), cur("LTC"), cur("ETH")).is_none());
    }

    #[test]
    fn cross_has_four_legs() {
        let r = Route::cross(cur("ETH"), cur("LTC"), cur("BTC")).unwrap();
        assert_eq!(r.leg_count(), 4);
        assert_eq!(r.markets().len(), 2);
    }
}
