//! Binance partial-depth book stream: a combined-stream WebSocket
//! delivering a full top-of-book snapshot per market on every frame, so
//! unlike Kraken there's no separate snapshot/diff handshake.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::core::domain::{Market, PriceLevel};
use crate::core::store::{BookKey, OrderBookStore};
use crate::error::{Error, Result};

use super::websocket::BookStream;

const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443";
/// Binance recycles combined-stream connections roughly every 24h; a
/// proactive reconnect avoids racing the venue's own forced close.
const SCHEDULED_RESET: Duration = Duration::from_secs(23 * 3600);

pub struct BinanceBookStream {
    ws_url: String,
    markets: Vec<Market>,
    store: Arc<OrderBookStore>,
    socket: Option<tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>>,
}

impl BinanceBookStream {
    pub fn new(markets: Vec<Market>, store: Arc<OrderBookStore>) -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            markets,
            store,
            socket: None,
        }
    }

    fn stream_url(&self) -> String {
        let streams = self
            .markets
            .iter()
            .map(|m| format!("{}@depth10@100ms", m.label().to_lowercase()))
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/stream?streams={streams}", self.ws_url)
    }

    fn market_for(&self, symbol: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.label().eq_ignore_ascii_case(symbol))
    }
}

#[derive(Deserialize)]
struct CombinedFrame {
    stream: String,
    data: DepthPayload,
}

#[derive(Deserialize)]
struct DepthPayload {
    #[serde(rename = "bids")]
    bids: Vec<[String; 2]>,
    #[serde(rename = "asks")]
    asks: Vec<[String; 2]>,
}

fn parse_levels(raw: &[[String; 2]]) -> Vec<PriceLevel> {
    raw.iter()
        .filter_map(|[price, qty]| {
            let price = price.parse().ok()?;
            let qty = qty.parse().ok()?;
            Some(PriceLevel::new(price, qty))
        })
        .collect()
}

#[async_trait]
impl BookStream for BinanceBookStream {
    async fn connect(&mut self) -> Result<()> {
        let url = self.stream_url();
        let (socket, _) = connect_async(&url)
            .await
            .map_err(Error::WebSocket)?;
        self.socket = Some(socket);
        Ok(())
    }

    async fn next_update(&mut self) -> Result<()> {
        let socket = self
            .socket
            .as_mut()
            .ok_or_else(|| Error::Execution("binance book stream used before connect".into()))?;

        let message = socket
            .next()
            .await
            .ok_or(Error::WebSocket(tokio_tungstenite::tungstenite::Error::ConnectionClosed))?
            .map_err(Error::WebSocket)?;

        let text = match message {
            Message::Text(t) => t,
            Message::Ping(_) | Message::Pong(_) => return Ok(()),
            Message::Close(_) => {
                return Err(Error::WebSocket(tokio_tungstenite::tungstenite::Error::ConnectionClosed))
            }
            _ => return Ok(()),
        };

        let frame: CombinedFrame = serde_json::from_str(&text).map_err(Error::Json)?;
        let symbol = frame.stream.split('@').next().unwrap_or(&frame.stream);
        let Some(market) = self.market_for(symbol) else {
            debug!(symbol, "depth frame for unconfigured market, ignoring");
            return Ok(());
        };

        let now = crate::core::scanner::now_secs();
        let bids = parse_levels(&frame.data.bids);
        let asks = parse_levels(&frame.data.asks);
        self.store.with_mut(&BookKey::new("binance", market.clone()), |book| {
            book.apply_snapshot(bids, asks, now);
        });

        Ok(())
    }

    fn venue(&self) -> &'static str {
        "binance"
    }

    fn scheduled_reset(&self) -> Option<Duration> {
        Some(SCHEDULED_RESET)
    }
}
