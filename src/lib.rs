//! Arby - cross-exchange cryptocurrency arbitrage detection and execution.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── core/
//! │   ├── domain/       # Pure domain types (currency, market, route, wallet, ...)
//! │   ├── exchange/     # Exchange adapter trait + venue implementations
//! │   ├── store/        # Thread-safe shared state (books, wallets, market info, live view)
//! │   ├── routing/       # Route enumeration
//! │   ├── pricing/       # Score, rate-adjustment, sizing, threshold math
//! │   ├── scanner/       # Main tick loop
//! │   ├── execution/     # Two-worker execution coordinator
//! │   └── persistence/  # Opportunity sink + relational persistence hooks
//! ├── app.rs             # Wires config + stores + tasks together
//! └── cli/               # `run` / `status` subcommands
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
