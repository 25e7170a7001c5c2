//! Deterministic enumeration of direct, multi-leg, and cross routes from
//! the selected currency set and each venue's discovered pairs.

use std::collections::{HashMap, HashSet};

use crate::core::domain::{Currency, CurrencyRole, Market, Route};

/// Builds route sets from a fixed input: the selected currencies, the set
/// of markets active on *every* venue (the intersection the caller has
/// already computed from each adapter's `discover_pairs`), and an optional
/// per-trade-currency base whitelist (`ARBY_CURRENCY_BASES`).
pub struct RouteBuilder {
    selected: Vec<Currency>,
    active_markets: HashSet<Market>,
    currency_bases: HashMap<Currency, Vec<Currency>>,
}

impl RouteBuilder {
    pub fn new(
        selected: Vec<Currency>,
        active_markets: HashSet<Market>,
        currency_bases: HashMap<Currency, Vec<Currency>>,
    ) -> Self {
        Self {
            selected,
            active_markets,
            currency_bases,
        }
    }

    /// Role derived by intersecting the active-market set with the
    /// selected currencies: a currency seen only as `base()` is BaseOnly,
    /// only as `trade()` is TradeOnly, seen in both positions is
    /// BaseAndTrade.
    fn role(&self, currency: &Currency) -> CurrencyRole {
        let mut can_base = false;
        let mut can_trade = false;
        for market in &self.active_markets {
            if market.base() == currency {
                can_base = true;
            }
            if market.trade() == currency {
                can_trade = true;
            }
        }
        match (can_base, can_trade) {
            (true, true) => CurrencyRole::BaseAndTrade,
            (true, false) => CurrencyRole::BaseOnly,
            (false, true) => CurrencyRole::TradeOnly,
            (false, false) => CurrencyRole::BaseOnly,
        }
    }

    fn trade_currencies(&self) -> Vec<Currency> {
        self.selected
            .iter()
            .filter(|c| self.role(c).can_be_trade())
            .cloned()
            .collect()
    }

    fn base_currencies(&self) -> Vec<Currency> {
        self.selected
            .iter()
            .filter(|c| self.role(c).can_be_base())
            .cloned()
            .collect()
    }

    /// Bases allowed for `trade`, honoring the whitelist when one is set.
    fn allowed_bases(&self, trade: &Currency) -> Vec<Currency> {
        match self.currency_bases.get(trade) {
            Some(bases) if !bases.is_empty() => bases.clone(),
            _ => self.base_currencies(),
        }
    }

    fn is_active(&self, trade: &Currency, base: &Currency) -> bool {
        self.active_markets
            .contains(&Market::new(trade.clone(), base.clone()))
    }

    /// Build the full deterministic route set: direct, then multi-leg,
    /// then cross, each in a stable iteration order over the selected
    /// currency list.
    pub fn build(&self) -> Vec<Route> {
        let mut routes = Vec::new();
        routes.extend(self.build_direct());
        routes.extend(self.build_multi_leg());
        routes.extend(self.build_cross());
        routes
    }

    fn build_direct(&self) -> Vec<Route> {
        let mut markets: Vec<&Market> = self.active_markets.iter().collect();
        markets.sort_by(|a, b| a.label().cmp(&b.label()));
        markets
            .into_iter()
            .map(|m| Route::direct(m.clone()))
            .collect()
    }

    fn build_multi_leg(&self) -> Vec<Route> {
        let mut routes = Vec::new();
        for trade in self.trade_currencies() {
            let bases = self.allowed_bases(&trade);
            for base_a in &bases {
                for base_b in &bases {
                    if base_a == base_b {
                        continue;
                    }
                    if !self.is_active(&trade, base_a) || !self.is_active(&trade, base_b) {
                        continue;
                    }
                    if !self.is_active(base_b, base_a) {
                        continue;
                    }
                    if let Some(route) =
                        Route::multi_leg(trade.clone(), base_a.clone(), base_b.clone())
                    {
                        routes.push(route);
                    }
                }
            }
        }
        routes
    }

    fn build_cross(&self) -> Vec<Route> {
        let mut routes = Vec::new();
        let trades = self.trade_currencies();
        for (i, trade_x) in trades.iter().enumerate() {
            for trade_y in trades.iter().skip(i + 1) {
                for base in self.base_currencies() {
                    if base == *trade_x || base == *trade_y {
                        continue;
                    }
                    if !self.is_active(trade_x, &base) || !self.is_active(trade_y, &base) {
                        continue;
                    }
                    if let Some(route) =
                        Route::cross(trade_x.clone(), trade_y.clone(), base.clone())
                    {
                        routes.push(route);
                    }
                }
            }
        }
        routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cur(s: &str) -> Currency {
        Currency::new(s)
    }

    fn market(trade: &str, base: &str) -> Market {
        Market::new(cur(trade), cur(base))
    }

    #[test]
    fn builds_one_direct_route_per_active_market() {
        let active: HashSet<Market> = [market("ETH", "BTC")].into_iter().collect();
        let builder = RouteBuilder::new(
            vec![cur("ETH"), cur("BTC")],
            active,
            HashMap::new(),
        );
        let routes = builder.build();
        assert_eq!(routes.iter().filter(|r| matches!(r, Route::Direct { .. })).count(), 1);
    }

    #[test]
    fn builds_multi_leg_when_all_three_legs_active() {
        let active: HashSet<Market> = [
            market("ETH", "BTC"),
            market("ETH", "USDT"),
            market("USDT", "BTC"),
        ]
        .into_iter()
        .collect();
        let builder = RouteBuilder::new(
            vec![cur("ETH"), cur("BTC"), cur("USDT")],
            active,
            HashMap::new(),
        );
        let routes = builder.build();
        let multi_leg_count = routes
            .iter()
            .filter(|r| matches!(r, Route::MultiLeg { .. }))
            .count();
        // Two directed (base_a, base_b) pairs: (BTC,USDT) and (USDT,BTC).
        assert_eq!(multi_leg_count, 2);
    }

    #[test]
    fn multi_leg_skipped_when_cross_pair_market_missing() {
        let active: HashSet<Market> = [market("ETH", "BTC"), market("ETH", "USDT")]
            .into_iter()
            .collect();
        let builder = RouteBuilder::new(
            vec![cur("ETH"), cur("BTC"), cur("USDT")],
            active,
            HashMap::new(),
        );
        let routes = builder.build();
        assert!(routes.iter().all(|r| !matches!(r, Route::MultiLeg { .. })));
    }

    #[test]
    fn currency_bases_whitelist_restricts_multi_leg_bases() {
        let active: HashSet<Market> = [
            market("ETH", "BTC"),
            market("ETH", "USDT"),
            market("USDT", "BTC"),
        ]
        .into_iter()
        .collect();
        let mut whitelist = HashMap::new();
        whitelist.insert(cur("ETH"), vec![cur("BTC")]);
        let builder = RouteBuilder::new(
            vec![cur("ETH"), cur("BTC"), cur("USDT")],
            active,
            whitelist,
        );
        let routes = builder.build();
        assert!(routes.iter().all(|r| !matches!(r, Route::MultiLeg { .. })));
    }

    #[test]
    fn builds_cross_route_for_two_trade_currencies_sharing_a_base() {
        let active: HashSet<Market> = [market("ETH", "BTC"), market("LTC", "BTC")]
            .into_iter()
            .collect();
        let builder = RouteBuilder::new(
            vec![cur("ETH"), cur("LTC"), cur("BTC")],
            active,
            HashMap::new(),
        );
        let routes = builder.build();
        assert_eq!(routes.iter().filter(|r| matches!(r, Route::Cross { .. })).count(), 1);
    }

    #[test]
    fn role_classifies_base_and_trade_currencies() {
        let active: HashSet<Market> = [market("ETH", "BTC"), market("USDT", "ETH")]
            .into_iter()
            .collect();
        let builder = RouteBuilder::new(vec![], active, HashMap::new());
        assert_eq!(builder.role(&cur("BTC")), CurrencyRole::BaseOnly);
        assert_eq!(builder.role(&cur("USDT")), CurrencyRole::TradeOnly);
        assert_eq!(builder.role(&cur("ETH")), CurrencyRole::BaseAndTrade);
    }

    #[test]
    fn build_is_idempotent_and_order_stable() {
        let active: HashSet<Market> = [
            market("ETH", "BTC"),
            market("ETH", "USDT"),
            market("USDT", "BTC"),
            market("LTC", "BTC"),
        ]
        .into_iter()
        .collect();
        let builder = RouteBuilder::new(
            vec![cur("ETH"), cur("LTC"), cur("BTC"), cur("USDT")],
            active,
            HashMap::new(),
        );
        assert_eq!(builder.build(), builder.build());
    }
}
