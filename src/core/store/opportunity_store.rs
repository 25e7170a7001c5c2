//! Append-only in-process log of every scan tick's candidate opportunity,
//! written regardless of dry-run mode. Independent of whatever
//! `PersistenceBackend` is configured — this store always runs.

use parking_lot::RwLock;

use crate::core::domain::Opportunity;

pub struct OpportunityStore {
    log: RwLock<Vec<Opportunity>>,
}

impl OpportunityStore {
    pub fn new() -> Self {
        Self {
            log: RwLock::new(Vec::new()),
        }
    }

    pub fn append(&self, opportunity: Opportunity) {
        self.log.write().push(opportunity);
    }

    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recent `n` entries, newest last.
    pub fn recent(&self, n: usize) -> Vec<Opportunity> {
        let log = self.log.read();
        let start = log.len().saturating_sub(n);
        log[start..].to_vec()
    }
}

impl Default for OpportunityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::RouteType;
    use rust_decimal_macros::dec;

    fn sample() -> Opportunity {
        Opportunity {
            ts: 1.0,
            route_type: RouteType::Direct,
            route_label: "ETHBTC".into(),
            buy_exchange: "kraken".into(),
            sell_exchange: "binance".into(),
            spread_pct: dec!(0.01),
            buy_rate: dec!(0.05),
            sell_rate: dec!(0.0505),
            cross_rate: None,
            qty_a: dec!(1),
            qty_b: dec!(1),
            executed: false,
            dry_run: true,
        }
    }

    #[test]
    fn append_then_len() {
        let store = OpportunityStore::new();
        store.append(sample());
        store.append(sample());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn recent_returns_newest_n_in_order() {
        let store = OpportunityStore::new();
        for i in 0..5 {
            let mut opp = sample();
            opp.ts = i as f64;
            store.append(opp);
        }
        let last_two = store.recent(2);
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].ts, 3.0);
        assert_eq!(last_two[1].ts, 4.0);
    }

    #[test]
    fn recent_clamps_when_fewer_entries_than_requested() {
        let store = OpportunityStore::new();
        store.append(sample());
        assert_eq!(store.recent(10).len(), 1);
    }
}
