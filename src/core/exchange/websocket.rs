//! Reconnect supervisor for order-book WebSocket streams: exponential
//! backoff and resubscribe-after-reconnect. Binance and Kraken's own
//! socket clients reconnect on any failure, and the Binance-like stream
//! additionally tears the connection down on a schedule (`reset_time`)
//! rather than waiting for a failure.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::Result;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// A venue-specific order-book socket. Implementations own the
/// `tokio-tungstenite` connection and translate venue frames into calls
/// against the order-book store before `next_update` returns.
#[async_trait]
pub trait BookStream: Send {
    /// Establish the connection and subscribe to the configured markets.
    async fn connect(&mut self) -> Result<()>;

    /// Block until the next frame is processed, or the connection drops.
    /// Returning `Err` signals the supervisor to reconnect.
    async fn next_update(&mut self) -> Result<()>;

    /// Venue name, for log context.
    fn venue(&self) -> &'static str;

    /// Some(duration) if this venue schedules a proactive reconnect
    /// (the Binance-like ~30h reset); `None` otherwise.
    fn scheduled_reset(&self) -> Option<Duration> {
        None
    }
}

/// Drive `stream` forever, reconnecting with exponential backoff
/// (1s doubling to a 60s cap) on any error, and honoring a scheduled
/// reset if the stream requests one. Returns only if `shutdown` fires.
pub async fn run_with_reconnect<S: BookStream>(
    mut stream: S,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        if *shutdown.borrow() {
            return;
        }

        if let Err(e) = stream.connect().await {
            error!(venue = stream.venue(), error = %e, "book stream connect failed");
            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = shutdown.changed() => if *shutdown.borrow() { return; },
            }
            backoff = (backoff * 2).min(MAX_BACKOFF);
            continue;
        }
        info!(venue = stream.venue(), "book stream connected");
        backoff = INITIAL_BACKOFF;

        let reset_deadline = stream
            .scheduled_reset()
            .map(|d| Box::pin(tokio::time::sleep(d)));

        let outcome = match reset_deadline {
            Some(mut deadline) => {
                tokio::select! {
                    res = stream.next_update() => res,
                    _ = &mut deadline => {
                        info!(venue = stream.venue(), "scheduled reset, reconnecting");
                        Err(crate::error::Error::WebSocket(
                            tokio_tungstenite::tungstenite::Error::ConnectionClosed,
                        ))
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() { return; }
                        continue;
                    }
                }
            }
            None => {
                tokio::select! {
                    res = stream.next_update() => res,
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() { return; }
                        continue;
                    }
                }
            }
        };

        if let Err(e) = outcome {
            warn!(venue = stream.venue(), error = %e, "book stream dropped, reconnecting");
        }
    }
}
