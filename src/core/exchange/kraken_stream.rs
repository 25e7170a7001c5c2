//! Kraken book stream: a single public WebSocket subscribed to `book`
//! for every configured pair, delivering one snapshot frame per pair
//! followed by incremental bid/ask updates. `XBT` is translated to `BTC`
//! at the boundary, matching the REST adapter.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::core::domain::{Currency, Market, PriceLevel};
use crate::core::store::{BookKey, OrderBookStore};
use crate::error::{Error, Result};

use super::websocket::BookStream;

const DEFAULT_WS_URL: &str = "wss://ws.kraken.com";

fn venue_pair(market: &Market) -> String {
    let trade = to_venue_asset(market.trade());
    let base = to_venue_asset(market.base());
    format!("{trade}/{base}")
}

fn to_venue_asset(currency: &Currency) -> String {
    if currency.as_str() == "BTC" {
        "XBT".to_string()
    } else {
        currency.as_str().to_string()
    }
}

pub struct KrakenBookStream {
    ws_url: String,
    markets: Vec<Market>,
    store: Arc<OrderBookStore>,
    pair_to_market: HashMap<String, Market>,
    socket: Option<tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>>,
}

impl KrakenBookStream {
    pub fn new(markets: Vec<Market>, store: Arc<OrderBookStore>) -> Self {
        let pair_to_market = markets.iter().map(|m| (venue_pair(m), m.clone())).collect();
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            markets,
            store,
            pair_to_market,
            socket: None,
        }
    }

    fn subscribe_payload(&self) -> Value {
        serde_json::json!({
            "event": "subscribe",
            "pair": self.markets.iter().map(venue_pair).collect::<Vec<_>>(),
            "subscription": { "name": "book", "depth": 10 },
        })
    }

    fn apply_side(&self, market: &Market, side_updates: &Value, is_bid: bool, now: f64) {
        let Some(levels) = side_updates.as_array() else { return };
        let levels: Vec<PriceLevel> = levels
            .iter()
            .filter_map(|lvl| {
                let price: Decimal = lvl.get(0)?.as_str()?.parse().ok()?;
                let qty: Decimal = lvl.get(1)?.as_str()?.parse().ok()?;
                Some(PriceLevel::new(price, qty))
            })
            .collect();

        self.store.with_mut(&BookKey::new("kraken", market.clone()), |book| {
            if is_bid {
                book.apply_bid_updates(&levels, now);
            } else {
                book.apply_ask_updates(&levels, now);
            }
        });
    }
}

#[async_trait]
impl BookStream for KrakenBookStream {
    async fn connect(&mut self) -> Result<()> {
        let (mut socket, _) = connect_async(&self.ws_url).await.map_err(Error::WebSocket)?;
        let payload = self.subscribe_payload().to_string();
        socket
            .send(Message::Text(payload))
            .await
            .map_err(Error::WebSocket)?;
        self.socket = Some(socket);
        Ok(())
    }

    async fn next_update(&mut self) -> Result<()> {
        let socket = self
            .socket
            .as_mut()
            .ok_or_else(|| Error::Execution("kraken book stream used before connect".into()))?;

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

        let frame: Value = serde_json::from_str(&text).map_err(Error::Json)?;

        // Control frames (subscription ack, heartbeat) are JSON objects;
        // book frames are arrays `[channelID, payload..., pairName]`.
        let Some(arr) = frame.as_array() else {
            debug!(frame = %text, "kraken control frame");
            return Ok(());
        };

        let Some(pair_name) = arr.last().and_then(|v| v.as_str()) else {
            return Ok(());
        };
        let Some(market) = self.pair_to_market.get(pair_name).cloned() else {
            debug!(pair_name, "book frame for unconfigured pair, ignoring");
            return Ok(());
        };

        let now = crate::core::scanner::now_secs();
        for entry in &arr[1..arr.len() - 1] {
            let Some(obj) = entry.as_object() else { continue };
            if let Some(bids) = obj.get("bs").or_else(|| obj.get("b")) {
                self.apply_side(&market, bids, true, now);
            }
            if let Some(asks) = obj.get("as").or_else(|| obj.get("a")) {
                self.apply_side(&market, asks, false, now);
            }
        }

        Ok(())
    }

    fn venue(&self) -> &'static str {
        "kraken"
    }
}
