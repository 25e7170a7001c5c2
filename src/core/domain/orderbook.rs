//! Order book snapshot and incremental-update semantics.

use rust_decimal::Decimal;

/// Number of levels retained per side after any snapshot or update.
pub const TOP_N: usize = 10;

/// A single price level: `[price, qty]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLevel {
    pub price: Decimal,
    pub qty: Decimal,
}

impl PriceLevel {
    pub fn new(price: Decimal, qty: Decimal) -> Self {
        Self { price, qty }
    }
}

/// Unified order-book snapshot for a single (exchange, market).
///
/// Bids are kept sorted descending by price, asks ascending; both are
/// truncated to [`TOP_N`] levels on every write. `last_update` is a
/// wall-clock timestamp (seconds) set on every write and never allowed to
/// go backwards for a given book.
#[derive(Debug, Clone, Default)]
pub struct OrderBookEntry {
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    last_update: Option<f64>,
}

impl OrderBookEntry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    pub fn last_update(&self) -> Option<f64> {
        self.last_update
    }

    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Replace both sides wholesale. Re-sorts (defensively, in case the
    /// adapter handed levels in venue order) and truncates to `TOP_N`.
    pub fn apply_snapshot(&mut self, bids: Vec<PriceLevel>, asks: Vec<PriceLevel>, now: f64) {
        self.bids = sorted_truncated(bids, true);
        self.asks = sorted_truncated(asks, false);
        self.last_update = Some(now);
    }

    /// Apply an incremental update to the bid side: remove any existing
    /// level at each given price, then insert it again if `qty > 0`.
    pub fn apply_bid_updates(&mut self, updates: &[PriceLevel], now: f64) {
        apply_updates(&mut self.bids, updates, true);
        self.last_update = Some(now);
    }

    /// Apply an incremental update to the ask side; see
    /// [`apply_bid_updates`](Self::apply_bid_updates).
    pub fn apply_ask_updates(&mut self, updates: &[PriceLevel], now: f64) {
        apply_updates(&mut self.asks, updates, false);
        self.last_update = Some(now);
    }

    /// `true` if `now - last_update <= max_age`; a book with no update yet
    /// is never fresh.
    pub fn is_fresh(&self, now: f64, max_age: f64) -> bool {
        match self.last_update {
            Some(t) => now - t <= max_age,
            None => false,
        }
    }

    /// Cumulative notional value of levels at-or-better than `rate`, on
    /// the given side. Used by `calc_volumes`'s order-book-depth cap.
    pub fn value_to_rate(&self, side: BookSide, rate: Decimal) -> Decimal {
        let levels: &[PriceLevel] = match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        };
        let mut qty_sum = Decimal::ZERO;
        for level in levels {
            let within = match side {
                BookSide::Bid => level.price >= rate,
                BookSide::Ask => level.price <= rate,
            };
            if !within {
                break;
            }
            qty_sum += level.qty;
        }
        qty_sum * rate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSide {
    Bid,
    Ask,
}

fn sorted_truncated(mut levels: Vec<PriceLevel>, descending: bool) -> Vec<PriceLevel> {
    levels.sort_by(|a, b| {
        if descending {
            b.price.cmp(&a.price)
        } else {
            a.price.cmp(&b.price)
        }
    });
    levels.truncate(TOP_N);
    levels
}

fn apply_updates(book: &mut Vec<PriceLevel>, updates: &[PriceLevel], descending: bool) {
    for update in updates {
        book.retain(|level| level.price != update.price);
        if update.qty > Decimal::ZERO {
            book.push(*update);
        }
    }
    book.sort_by(|a, b| {
        if descending {
            b.price.cmp(&a.price)
        } else {
            a.price.cmp(&b.price)
        }
    });
    book.truncate(TOP_N);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: &str, qty: &str) -> PriceLevel {
        PriceLevel::new(price.parse().unwrap(), qty.parse().unwrap())
    }

    #[test]
    fn snapshot_sorts_bids_descending_and_asks_ascending() {
        let mut book = OrderBookEntry::empty();
        book.apply_snapshot(
            vec![level("1.0", "1"), level("3.0", "1"), level("2.0", "1")],
            vec![level("5.0", "1"), level("4.0", "1")],
            100.0,
        );
        assert_eq!(book.bids()[0].price, dec!(3.0));
        assert_eq!(book.bids()[2].price, dec!(1.0));
        assert_eq!(book.asks()[0].price, dec!(4.0));
    }

    #[test]
    fn snapshot_truncates_to_top_n() {
        let mut book = OrderBookEntry::empty();
        let bids: Vec<PriceLevel> = (0..20)
            .map(|i| PriceLevel::new(Decimal::from(i), Decimal::ONE))
            .collect();
        book.apply_snapshot(bids, Vec::new(), 1.0);
        assert_eq!(book.bids().len(), TOP_N);
        // Highest prices retained.
        assert_eq!(book.bids()[0].price, Decimal::from(19));
    }

    #[test]
    fn incremental_update_replaces_level_at_same_price() {
        let mut book = OrderBookEntry::empty();
        book.apply_snapshot(vec![level("1.0", "5")], Vec::new(), 1.0);
        book.apply_bid_updates(&[level("1.0", "9")], 2.0);
        assert_eq!(book.bids().len(), 1);
        assert_eq!(book.bids()[0].qty, dec!(9));
    }

    #[test]
    fn incremental_update_zero_qty_removes_level() {
        let mut book = OrderBookEntry::empty();
        book.apply_snapshot(vec![level("1.0", "5"), level("2.0", "5")], Vec::new(), 1.0);
        book.apply_bid_updates(&[level("2.0", "0")], 2.0);
        assert_eq!(book.bids().len(), 1);
        assert_eq!(book.bids()[0].price, dec!(1.0));
    }

    #[test]
    fn last_update_advances_on_every_write() {
        let mut book = OrderBookEntry::empty();
        book.apply_snapshot(Vec::new(), Vec::new(), 1.0);
        assert_eq!(book.last_update(), Some(1.0));
        book.apply_ask_updates(&[], 2.0);
        assert_eq!(book.last_update(), Some(2.0));
    }

    #[test]
    fn freshness_gate() {
        let mut book = OrderBookEntry::empty();
        assert!(!book.is_fresh(10.0, 5.0));
        book.apply_snapshot(Vec::new(), Vec::new(), 10.0);
        assert!(book.is_fresh(14.0, 5.0));
        assert!(!book.is_fresh(16.0, 5.0));
    }

    #[test]
    fn value_to_rate_sums_cumulative_levels_within_rate() {
        let mut book = OrderBookEntry::empty();
        book.apply_snapshot(
            vec![level("3.0", "2"), level("2.0", "2"), level("1.0", "2")],
            Vec::new(),
            1.0,
        );
        // Bid value down to rate 2.0: levels 3.0 and 2.0 qualify (>= 2.0).
        let value = book.value_to_rate(BookSide::Bid, dec!(2.0));
        assert_eq!(value, dec!(2.0) * dec!(4));
    }

    #[test]
    fn best_bid_and_ask() {
        let mut book = OrderBookEntry::empty();
        book.apply_snapshot(vec![level("1.0", "1")], vec![level("2.0", "1")], 1.0);
        assert_eq!(book.best_bid().unwrap().price, dec!(1.0));
        assert_eq!(book.best_ask().unwrap().price, dec!(2.0));
    }
}
