//! Three-signal rendezvous between the scanner and its two execution
//! workers, built on `tokio::sync::Notify` and `tokio::time::timeout`,
//! mirroring the `tokio::sync::watch` pattern `cli/run.rs` uses for
//! cooperative shutdown.

use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::timeout;
use tracing::warn;

use crate::error::{Error, Result};

/// Direct routes (2 legs) get 60s to complete; multi-leg and cross
/// routes, which run a follow-up leg after the primary, get 120s.
pub const DIRECT_TIMEOUT: Duration = Duration::from_secs(60);
pub const FOLLOW_UP_TIMEOUT: Duration = Duration::from_secs(120);

/// `s0`, `s1`, `s2` from the route-family worker protocol: the scanner
/// signals `s0` once both workers' `TradeDescriptor`s are populated, each
/// worker signals its own `s1`/`s2` on completion, and the scanner awaits
/// both with a timeout.
#[derive(Default)]
pub struct Rendezvous {
    s0: Notify,
    s1: Notify,
    s2: Notify,
}

impl Rendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal_start(&self) {
        self.s0.notify_waiters();
    }

    pub async fn wait_start(&self) {
        self.s0.notified().await;
    }

    pub fn signal_worker_one(&self) {
        self.s1.notify_one();
    }

    pub fn signal_worker_two(&self) {
        self.s2.notify_one();
    }

    /// Awaits both workers' completion signals, bounded by `timeout_dur`.
    /// A timeout logs and returns `Err` but never panics — the scanner
    /// moves on to the next tick either way.
    pub async fn await_completion(&self, timeout_dur: Duration) -> Result<()> {
        let both = async {
            self.s1.notified().await;
            self.s2.notified().await;
        };
        timeout(timeout_dur, both).await.map_err(|_| {
            warn!("execution rendezvous timed out waiting on both workers");
            Error::Timeout {
                stage: "worker completion".into(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn await_completion_resolves_once_both_workers_signal() {
        let rendezvous = Arc::new(Rendezvous::new());
        let r1 = rendezvous.clone();
        let r2 = rendezvous.clone();
        tokio::spawn(async move {
            r1.signal_worker_one();
        });
        tokio::spawn(async move {
            r2.signal_worker_two();
        });
        let result = rendezvous.await_completion(StdDuration::from_secs(1)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn await_completion_times_out_when_a_worker_never_signals() {
        let rendezvous = Rendezvous::new();
        rendezvous.signal_worker_one();
        let result = rendezvous
            .await_completion(StdDuration::from_millis(20))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn wait_start_resolves_after_signal_start() {
        let rendezvous = Arc::new(Rendezvous::new());
        let waiter = rendezvous.clone();
        let handle = tokio::spawn(async move {
            waiter.wait_start().await;
        });
        tokio::time::sleep(StdDuration::from_millis(10)).await;
        rendezvous.signal_start();
        handle.await.unwrap();
    }
}
