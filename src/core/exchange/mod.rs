//! Exchange adapters and their shared request-signing and reconnect
//! machinery.
//!
//! ## Adding a new venue
//!
//! 1. Implement [`ExchangeAdapter`] against its REST API.
//! 2. Add a request-signing function to [`signer`] if its auth scheme
//!    differs from the two already present.
//! 3. Implement [`BookStream`] for its order-book WebSocket feed and drive
//!    it with [`websocket::run_with_reconnect`].

mod adapter;
mod binance;
mod binance_stream;
mod kraken;
mod kraken_stream;
mod signer;
mod websocket;

pub use adapter::{ExchangeAdapter, OrderId, OrderStatus};
pub use binance::BinanceAdapter;
pub use binance_stream::BinanceBookStream;
pub use kraken::KrakenAdapter;
pub use kraken_stream::KrakenBookStream;
pub use websocket::{run_with_reconnect, BookStream};
