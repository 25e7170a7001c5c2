//! Thread-safe per-venue market-metadata cache (fees, precisions, minima),
//! populated once at startup and refreshed on control-plane reload.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::core::domain::{Market, MarketInfo};

pub struct MarketInfoStore {
    info: RwLock<HashMap<(String, Market), MarketInfo>>,
}

impl MarketInfoStore {
    pub fn new() -> Self {
        Self {
            info: RwLock::new(HashMap::new()),
        }
    }

    pub fn set(&self, exchange: impl Into<String>, market: Market, info: MarketInfo) {
        self.info.write().insert((exchange.into(), market), info);
    }

    pub fn get(&self, exchange: &str, market: &Market) -> Option<MarketInfo> {
        self.info
            .read()
            .get(&(exchange.to_string(), market.clone()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.info.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MarketInfoStore {
    fn default() -> Self {
        Self::new()
    }
}
