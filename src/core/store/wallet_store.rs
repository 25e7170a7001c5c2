//! Thread-safe per-venue wallet store.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::core::domain::Wallet;

pub struct WalletStore {
    wallets: RwLock<HashMap<String, Wallet>>,
}

impl WalletStore {
    pub fn new() -> Self {
        Self {
            wallets: RwLock::new(HashMap::new()),
        }
    }

    /// Overwrite a venue's whole wallet, as done after `get_balances`
    /// refreshes following an execution.
    pub fn replace(&self, exchange: impl Into<String>, wallet: Wallet) {
        self.wallets.write().insert(exchange.into(), wallet);
    }

    pub fn get(&self, exchange: &str) -> Option<Wallet> {
        self.wallets.read().get(exchange).cloned()
    }

    pub fn get_pair(&self, a: &str, b: &str) -> (Option<Wallet>, Option<Wallet>) {
        let wallets = self.wallets.read();
        (wallets.get(a).cloned(), wallets.get(b).cloned())
    }

    /// Every venue's wallet, for a status read.
    pub fn all(&self) -> Vec<(String, Wallet)> {
        self.wallets
            .read()
            .iter()
            .map(|(exchange, wallet)| (exchange.clone(), wallet.clone()))
            .collect()
    }
}

impl Default for WalletStore {
    fn default() -> Self {
        Self::new()
    }
}
