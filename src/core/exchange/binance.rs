//! Binance REST adapter. Signed endpoints carry a `timestamp` query
//! parameter and an HMAC-SHA256 `signature` appended to the URL-encoded
//! query, with the API key carried in the `X-MBX-APIKEY` header.

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ExchangeCredentials;
use crate::core::domain::{Balance, Currency, Market, MarketInfo, Side, Wallet};
use crate::core::exchange::adapter::{ExchangeAdapter, OrderId, OrderStatus};
use crate::core::exchange::signer::binance_signature;
use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.binance.com";

pub struct BinanceAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl BinanceAdapter {
    pub fn new(credentials: ExchangeCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: credentials
                .api_base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: credentials.api_key,
            api_secret: credentials.api_secret,
        }
    }

    fn timestamp_millis() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is after the Unix epoch")
            .as_millis()
    }

    /// Build a signed query string and the signature appended to it.
    fn signed_query(&self, mut params: Vec<(String, String)>) -> String {
        params.push(("timestamp".into(), Self::timestamp_millis().to_string()));
        let query = serde_urlencoded::to_string(&params).expect("params are valid UTF-8 pairs");
        let signature = binance_signature(&self.api_secret, &query);
        format!("{query}&signature={signature}")
    }

    async fn signed_get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<T> {
        let query = self.signed_query(params);
        let url = format!("{}{}?{}", self.base_url, path, query);
        let resp = self
            .client
            .get(url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;
        Self::parse_response(resp).await
    }

    async fn signed_post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<T> {
        let query = self.signed_query(params);
        let url = format!("{}{}?{}", self.base_url, path, query);
        let resp = self
            .client
            .post(url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;
        Self::parse_response(resp).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Exchange {
                exchange: "binance".into(),
                message: format!("HTTP {status}: {body}"),
            });
        }
        serde_json::from_str(&body).map_err(Error::from)
    }
}

#[derive(Debug, Deserialize)]
struct BalanceEntry {
    asset: String,
    free: String,
    locked: String,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    balances: Vec<BalanceEntry>,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
    #[serde(rename = "baseAsset")]
    base_asset: String,
    #[serde(rename = "quoteAsset")]
    quote_asset: String,
    filters: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    #[serde(rename = "orderId")]
    order_id: i64,
}

#[derive(Debug, Deserialize)]
struct OrderQuery {
    status: String,
    #[serde(rename = "executedQty")]
    executed_qty: String,
    #[serde(rename = "origQty")]
    orig_qty: String,
}

/// Parses Binance's `filters` array for `minOrderValue`/precision hints,
/// mirroring `getMarketInfo` in `bnnc.py`.
fn market_info_from_filters(filters: &[serde_json::Value]) -> (u32, u32, Decimal) {
    let mut rate_precision = 8;
    let mut volume_precision = 8;
    let mut min_trade_volume = Decimal::ZERO;

    for filter in filters {
        match filter.get("filterType").and_then(|v| v.as_str()) {
            Some("PRICE_FILTER") => {
                if let Some(tick) = filter.get("tickSize").and_then(|v| v.as_str()) {
                    rate_precision = decimal_places(tick);
                }
            }
            Some("LOT_SIZE") => {
                if let Some(step) = filter.get("stepSize").and_then(|v| v.as_str()) {
                    volume_precision = decimal_places(step);
                }
                if let Some(min_qty) = filter.get("minQty").and_then(|v| v.as_str()) {
                    min_trade_volume = min_qty.parse().unwrap_or(Decimal::ZERO);
                }
            }
            _ => {}
        }
    }

    (rate_precision, volume_precision, min_trade_volume)
}

fn decimal_places(step: &str) -> u32 {
    step.parse::<Decimal>()
        .map(|d| d.normalize().scale())
        .unwrap_or(8)
}

#[async_trait]
impl ExchangeAdapter for BinanceAdapter {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn get_balances(&self) -> Result<Wallet> {
        let account: AccountInfo = self.signed_get("/api/v3/account", Vec::new()).await?;
        let mut wallet = Wallet::new();
        for entry in account.balances {
            let available: Decimal = entry.free.parse().unwrap_or(Decimal::ZERO);
            let reserved: Decimal = entry.locked.parse().unwrap_or(Decimal::ZERO);
            wallet.set(Currency::new(entry.asset), Balance::new(available, reserved));
        }
        Ok(wallet)
    }

    async fn get_market_info(
        &self,
        markets: &[Market],
    ) -> Result<HashMap<Market, MarketInfo>> {
        let resp = self
            .client
            .get(format!("{}/api/v3/exchangeInfo", self.base_url))
            .send()
            .await?;
        let info: ExchangeInfo = Self::parse_response(resp).await?;

        let wanted: HashSet<String> = markets.iter().map(Market::label).collect();
        let mut out = HashMap::new();
        for symbol in info.symbols {
            if !wanted.contains(&symbol.symbol) {
                continue;
            }
            let (rate_precision, volume_precision, min_trade_volume) =
                market_info_from_filters(&symbol.filters);
            let market = Market::new(
                Currency::new(&symbol.base_asset),
                Currency::new(&symbol.quote_asset),
            );
            out.insert(
                market,
                MarketInfo {
                    trade_fee: Decimal::new(1, 3), // 0.001, Binance spot default taker fee
                    rate_precision,
                    volume_precision,
                    min_trade_volume,
                    min_order_value_btc: None,
                    min_order_value_eth: None,
                },
            );
        }
        Ok(out)
    }

    async fn place_order(
        &self,
        market: &Market,
        rate: Decimal,
        volume: Decimal,
        side: Side,
    ) -> Result<OrderId> {
        let side_str = match side {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        };
        let params = vec![
            ("symbol".into(), market.label()),
            ("side".into(), side_str.into()),
            ("type".into(), "LIMIT".into()),
            ("timeInForce".into(), "GTC".into()),
            ("quantity".into(), volume.to_string()),
            ("price".into(), rate.to_string()),
        ];
        let resp: OrderResponse = self.signed_post("/api/v3/order", params).await?;
        debug!(order_id = resp.order_id, %market, "placed binance order");
        Ok(OrderId::new(resp.order_id.to_string()))
    }

    async fn cancel_order(&self, order_id: &OrderId, market: &Market) -> Result<()> {
        let params = vec![
            ("symbol".into(), market.label()),
            ("orderId".into(), order_id.as_str().to_string()),
        ];
        let query = self.signed_query(params);
        let url = format!("{}/api/v3/order?{}", self.base_url, query);
        let resp = self
            .client
            .delete(url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;
        if !resp.status().is_success() {
            warn!(%order_id, "binance cancel returned non-success status");
        }
        Ok(())
    }

    async fn get_order_data(&self, order_id: &OrderId, market: &Market) -> Result<OrderStatus> {
        let params = vec![
            ("symbol".into(), market.label()),
            ("orderId".into(), order_id.as_str().to_string()),
        ];
        let query: OrderQuery = self.signed_get("/api/v3/order", params).await?;
        let filled_qty: Decimal = query.executed_qty.parse().unwrap_or(Decimal::ZERO);
        let orig_qty: Decimal = query.orig_qty.parse().unwrap_or(Decimal::ZERO);
        Ok(OrderStatus {
            order_id: order_id.clone(),
            filled_qty,
            quantity_remaining: (orig_qty - filled_qty).max(Decimal::ZERO),
            is_open: matches!(query.status.as_str(), "NEW" | "PARTIALLY_FILLED"),
        })
    }

    async fn discover_pairs(&self) -> Result<HashSet<(Currency, Currency)>> {
        let resp = self
            .client
            .get(format!("{}/api/v3/exchangeInfo", self.base_url))
            .send()
            .await?;
        let info: ExchangeInfo = Self::parse_response(resp).await?;
        Ok(info
            .symbols
            .into_iter()
            .map(|s| (Currency::new(s.base_asset), Currency::new(s.quote_asset)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_info_from_filters_reads_tick_and_step_size() {
        let filters = serde_json::json!([
            {"filterType": "PRICE_FILTER", "tickSize": "0.00010000"},
            {"filterType": "LOT_SIZE", "stepSize": "0.00100000", "minQty": "0.00100000"},
        ]);
        let (rate_precision, volume_precision, min_trade_volume) =
            market_info_from_filters(filters.as_array().unwrap());
        assert_eq!(rate_precision, 4);
        assert_eq!(volume_precision, 3);
        assert_eq!(min_trade_volume, Decimal::new(1, 3));
    }

    #[test]
    fn decimal_places_counts_fractional_digits() {
        assert_eq!(decimal_places("0.0001"), 4);
        assert_eq!(decimal_places("1"), 0);
    }
}
