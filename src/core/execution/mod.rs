//! The two-worker execution coordinator: a scanner hands a pair of
//! `TradeDescriptor`s to two concurrent workers, each chasing its own
//! fill, and rendezvous on completion or timeout.

mod coordinator;
mod worker;

pub use coordinator::{Rendezvous, DIRECT_TIMEOUT, FOLLOW_UP_TIMEOUT};
pub use worker::{run_worker, FilledLeg, MAX_RETRIES};
