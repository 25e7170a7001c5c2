//! Everything one scan tick needs: the stores, the live adapter set, and
//! the tunables pulled from `Config`. Threaded through explicitly rather
//! than reached for as globals.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::core::exchange::ExchangeAdapter;
use crate::core::persistence::PersistenceBackend;
use crate::core::store::{LiveStore, MarketInfoStore, OpportunityStore, OrderBookStore, RouteList, WalletStore};

/// Freshness window a book must clear to be used in scoring (§4.4).
pub const FRESHNESS_MAX_AGE_SECS: f64 = 5.0;

/// How long the scanner sleeps between full passes over the route list.
pub const TICK_INTERVAL_MS: u64 = 100;

pub struct Context {
    pub adapters: HashMap<String, Arc<dyn ExchangeAdapter>>,
    pub books: Arc<OrderBookStore>,
    pub wallets: WalletStore,
    pub market_info: MarketInfoStore,
    pub live: LiveStore,
    pub routes: RouteList,
    pub opportunities: OpportunityStore,
    pub persistence: Arc<dyn PersistenceBackend>,
    pub min_profit: Decimal,
    pub dry_run: bool,
    /// Wall-clock seconds of the most recently completed tick, read by
    /// the status writer.
    pub last_tick: RwLock<f64>,
}

impl Context {
    /// Every ordered pair of distinct venue names currently registered.
    /// With exactly two adapters (Binance-like, Kraken-like) this yields
    /// the two (A, B) orderings the scanner tries per route.
    pub fn venue_pairs(&self) -> Vec<(String, String)> {
        let names: Vec<&String> = self.adapters.keys().collect();
        let mut pairs = Vec::new();
        for a in &names {
            for b in &names {
                if a != b {
                    pairs.push(((*a).clone(), (*b).clone()));
                }
            }
        }
        pairs.sort();
        pairs
    }

    pub fn adapter(&self, exchange: &str) -> Option<Arc<dyn ExchangeAdapter>> {
        self.adapters.get(exchange).cloned()
    }
}
