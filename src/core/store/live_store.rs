//! The live-comparison snapshot: the best (venue A, venue B) pair and raw
//! score the scanner found for each route on its most recent tick, plus a
//! running histogram and high-water mark per route.

use std::collections::HashMap;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::domain::Route;

/// Histogram buckets the scanner increments on every tick per §4.4:
/// scores exceeding 0.4%, 0.5%, 0.75%, and 1%.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBuckets {
    pub over_0_4_pct: u64,
    pub over_0_5_pct: u64,
    pub over_0_75_pct: u64,
    pub over_1_pct: u64,
}

impl HistogramBuckets {
    fn record(&mut self, score: Decimal) {
        let pct = |p: &str| p.parse::<Decimal>().unwrap();
        if score > pct("0.004") {
            self.over_0_4_pct += 1;
        }
        if score > pct("0.005") {
            self.over_0_5_pct += 1;
        }
        if score > pct("0.0075") {
            self.over_0_75_pct += 1;
        }
        if score > pct("0.01") {
            self.over_1_pct += 1;
        }
    }
}

/// The most recent tick's best-pair result for one route.
#[derive(Debug, Clone)]
pub struct LiveComparison {
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub score: Decimal,
    pub histogram: HistogramBuckets,
    pub highest_seen: Decimal,
}

pub struct LiveStore {
    entries: RwLock<HashMap<Route, LiveComparison>>,
}

impl LiveStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Publish this tick's best pair and score for `route`, folding the
    /// score into the route's histogram and high-water mark.
    pub fn publish(&self, route: Route, buy_exchange: String, sell_exchange: String, score: Decimal) {
        let mut entries = self.entries.write();
        let entry = entries.entry(route).or_insert_with(|| LiveComparison {
            buy_exchange: buy_exchange.clone(),
            sell_exchange: sell_exchange.clone(),
            score,
            histogram: HistogramBuckets::default(),
            highest_seen: score,
        });
        entry.buy_exchange = buy_exchange;
        entry.sell_exchange = sell_exchange;
        entry.score = score;
        entry.histogram.record(score);
        if score > entry.highest_seen {
            entry.highest_seen = score;
        }
    }

    pub fn get(&self, route: &Route) -> Option<LiveComparison> {
        self.entries.read().get(route).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Snapshot of every route's latest comparison, for a status read.
    pub fn entries(&self) -> Vec<(Route, LiveComparison)> {
        self.entries
            .read()
            .iter()
            .map(|(route, comparison)| (route.clone(), comparison.clone()))
            .collect()
    }
}

impl Default for LiveStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{Currency, Market};
    use rust_decimal_macros::dec;

    fn route() -> Route {
        Route::direct(Market::new(Currency::new("ETH"), Currency::new("BTC")))
    }

    #[test]
    fn publish_records_score_and_high_water_mark() {
        let store = LiveStore::new();
        store.publish(route(), "kraken".into(), "binance".into(), dec!(0.006));
        let entry = store.get(&route()).unwrap();
        assert_eq!(entry.score, dec!(0.006));
        assert_eq!(entry.highest_seen, dec!(0.006));
        assert_eq!(entry.histogram.over_0_5_pct, 1);
        assert_eq!(entry.histogram.over_0_75_pct, 0);
    }

    #[test]
    fn high_water_mark_never_decreases() {
        let store = LiveStore::new();
        store.publish(route(), "kraken".into(), "binance".into(), dec!(0.02));
        store.publish(route(), "kraken".into(), "binance".into(), dec!(0.001));
        let entry = store.get(&route()).unwrap();
        assert_eq!(entry.highest_seen, dec!(0.02));
        assert_eq!(entry.score, dec!(0.001));
    }

    #[test]
    fn histogram_accumulates_across_ticks() {
        let store = LiveStore::new();
        store.publish(route(), "a".into(), "b".into(), dec!(0.012));
        store.publish(route(), "a".into(), "b".into(), dec!(0.012));
        let entry = store.get(&route()).unwrap();
        assert_eq!(entry.histogram.over_1_pct, 2);
        assert_eq!(entry.histogram.over_0_4_pct, 2);
    }
}
