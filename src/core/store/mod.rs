//! Shared in-process stores. Each is a single `parking_lot::RwLock`-guarded
//! map: a brief critical section per read or write keeps the scanner's
//! per-tick latency predictable without per-key locking complexity.

mod live_store;
mod market_info_store;
mod opportunity_store;
mod orderbook_store;
mod route_store;
mod status;
mod wallet_store;

pub use live_store::{HistogramBuckets, LiveComparison, LiveStore};
pub use market_info_store::MarketInfoStore;
pub use opportunity_store::OpportunityStore;
pub use orderbook_store::{BookKey, BookUpdate, OrderBookStore};
pub use route_store::RouteList;
pub use status::{RouteStatus, StatusFile, StatusSnapshot, WalletSummary};
pub use wallet_store::WalletStore;
