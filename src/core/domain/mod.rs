//! Core domain types: currencies, markets, order books, wallets, routes,
//! trade descriptors, and opportunity records.
//!
//! ## Identifiers and venue metadata
//!
//! - [`Currency`] / [`CurrencyRole`] - a traded symbol and its role in the
//!   selected currency set
//! - [`Market`] / [`MarketInfo`] - a trade/base pair and its per-venue fees
//!   and precisions
//!
//! ## Order books and wallets
//!
//! - [`OrderBookEntry`] / [`PriceLevel`] / [`BookSide`] - bids/asks with
//!   snapshot and incremental-update operations
//! - [`Wallet`] / [`Balance`] - per-venue available/reserved funds
//!
//! ## Routes and execution
//!
//! - [`Route`] - direct, multi-leg, or cross arbitrage shape
//! - [`TradeDescriptor`] / [`Side`] / [`FollowUp`] - one leg handed to a
//!   worker
//! - [`Opportunity`] / [`RouteType`] - one scan tick's recorded candidate
//!
//! ## Arithmetic
//!
//! - [`decimal`] - fixed-precision rounding helpers used throughout pricing

pub mod decimal;

mod currency;
mod market;
mod opportunity;
mod orderbook;
mod route;
mod trade;
mod wallet;

pub use currency::{Currency, CurrencyRole};
pub use market::{Market, MarketInfo};
pub use opportunity::{Opportunity, RouteType};
pub use orderbook::{BookSide, OrderBookEntry, PriceLevel};
pub use route::Route;
pub use trade::{FollowUp, Side, TradeDescriptor};
pub use wallet::{Balance, Wallet};
