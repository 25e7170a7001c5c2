//! Thread-safe cache of order books, keyed by (exchange, market): a
//! single `RwLock<HashMap>` around the whole store, a brief critical
//! section per operation, plus an optional broadcast channel so the
//! scanner can wake on update instead of polling.

use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::core::domain::{Market, OrderBookEntry};

/// Key identifying a single venue's book for a single market.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookKey {
    pub exchange: String,
    pub market: Market,
}

impl BookKey {
    pub fn new(exchange: impl Into<String>, market: Market) -> Self {
        Self {
            exchange: exchange.into(),
            market,
        }
    }
}

/// Notification sent to subscribers whenever a book changes.
#[derive(Debug, Clone)]
pub struct BookUpdate {
    pub key: BookKey,
}

pub struct OrderBookStore {
    books: RwLock<HashMap<BookKey, OrderBookEntry>>,
    tx: Option<broadcast::Sender<BookUpdate>>,
}

impl OrderBookStore {
    pub fn new() -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            tx: None,
        }
    }

    pub fn with_notifications(capacity: usize) -> (Self, broadcast::Receiver<BookUpdate>) {
        let (tx, rx) = broadcast::channel(capacity);
        (
            Self {
                books: RwLock::new(HashMap::new()),
                tx: Some(tx),
            },
            rx,
        )
    }

    pub fn subscribe(&self) -> Option<broadcast::Receiver<BookUpdate>> {
        self.tx.as_ref().map(|tx| tx.subscribe())
    }

    /// Replace or insert a book and notify subscribers.
    pub fn update(&self, key: BookKey, book: OrderBookEntry) {
        self.books.write().insert(key.clone(), book);
        if let Some(tx) = &self.tx {
            let _ = tx.send(BookUpdate { key });
        }
    }

    /// Mutate a book in place via `f`, creating an empty one first if
    /// absent. Used by incremental-update frames, which need read-modify-
    /// write under a single lock acquisition.
    pub fn with_mut(&self, key: &BookKey, f: impl FnOnce(&mut OrderBookEntry)) {
        let mut books = self.books.write();
        let entry = books.entry(key.clone()).or_default();
        f(entry);
        if let Some(tx) = &self.tx {
            let _ = tx.send(BookUpdate { key: key.clone() });
        }
    }

    pub fn get(&self, key: &BookKey) -> Option<OrderBookEntry> {
        self.books.read().get(key).cloned()
    }

    /// Snapshot two books under one lock acquisition, so the scanner never
    /// observes a torn pair mid-update.
    pub fn get_pair(&self, a: &BookKey, b: &BookKey) -> (Option<OrderBookEntry>, Option<OrderBookEntry>) {
        let books = self.books.read();
        (books.get(a).cloned(), books.get(b).cloned())
    }

    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OrderBookStore {
    fn default() -> Self {
        Self::new()
    }
}
