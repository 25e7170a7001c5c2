//! Kraken REST adapter. Private calls sign
//! `uri_path || SHA256(nonce || postdata)` with HMAC-SHA512, base64-encode
//! the digest into an `API-Sign` header, and are spaced at least 1s apart.
//! Kraken's `XBT` asset code is translated to `BTC` at the adapter
//! boundary so the rest of the core never sees it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::config::ExchangeCredentials;
use crate::core::domain::{Balance, Currency, Market, MarketInfo, Side, Wallet};
use crate::core::exchange::adapter::{ExchangeAdapter, OrderId, OrderStatus};
use crate::core::exchange::signer::kraken_signature;
use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.kraken.com";
const MIN_PRIVATE_CALL_SPACING: Duration = Duration::from_secs(1);

/// Kraken's legacy asset code for Bitcoin. Translated to/from `BTC` at the
/// adapter boundary so the rest of the core stays venue-agnostic.
const KRAKEN_XBT: &str = "XBT";
const BTC: &str = "BTC";

fn to_venue_asset(currency: &Currency) -> String {
    if currency.as_str() == BTC {
        KRAKEN_XBT.to_string()
    } else {
        currency.as_str().to_string()
    }
}

fn from_venue_asset(asset: &str) -> Currency {
    if asset.eq_ignore_ascii_case(KRAKEN_XBT) || asset == "ZXBT" {
        Currency::new(BTC)
    } else {
        // Kraken prefixes some legacy fiat/quote assets with Z/X; strip it
        // only when the remainder is itself a currency we recognize is
        // unnecessary here since the selected currency set already
        // normalizes casing — pass through untouched.
        Currency::new(asset)
    }
}

pub struct KrakenAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    nonce: AtomicI64,
    last_private_call: Mutex<Option<Instant>>,
}

impl KrakenAdapter {
    pub fn new(credentials: ExchangeCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: credentials.api_key,
            api_secret: credentials.api_secret,
            nonce: AtomicI64::new(0),
            last_private_call: Mutex::new(None),
        }
    }

    fn next_nonce(&self) -> i64 {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is after the Unix epoch")
            .as_millis() as i64;
        // fetch_max enforces strict monotonicity even if the wall clock
        // hasn't advanced between two calls in the same millisecond.
        let candidate = millis;
        let prev = self.nonce.fetch_max(candidate, Ordering::SeqCst);
        if candidate > prev {
            candidate
        } else {
            self.nonce.fetch_add(1, Ordering::SeqCst) + 1
        }
    }

    async fn throttle(&self) {
        let wait = {
            let mut last = self.last_private_call.lock();
            let wait = last
                .map(|t| MIN_PRIVATE_CALL_SPACING.saturating_sub(t.elapsed()))
                .unwrap_or_default();
            *last = Some(Instant::now());
            wait
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    async fn private<T: serde::de::DeserializeOwned>(
        &self,
        uri_path: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<T> {
        self.throttle().await;

        let nonce = self.next_nonce().to_string();
        params.push(("nonce".into(), nonce.clone()));
        let postdata = serde_urlencoded::to_string(&params).expect("params are valid UTF-8 pairs");
        let signature = kraken_signature(&self.api_secret, uri_path, &nonce, &postdata);

        let resp = self
            .client
            .post(format!("{}{}", self.base_url, uri_path))
            .header("API-Key", &self.api_key)
            .header("API-Sign", signature)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(postdata)
            .send()
            .await?;
        Self::parse_response(resp).await
    }

    async fn public<T: serde::de::DeserializeOwned>(
        &self,
        uri_path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, uri_path))
            .query(params)
            .send()
            .await?;
        Self::parse_response(resp).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Exchange {
                exchange: "kraken".into(),
                message: format!("HTTP {status}: {body}"),
            });
        }
        let envelope: KrakenEnvelope<T> = serde_json::from_str(&body)?;
        if !envelope.error.is_empty() {
            return Err(Error::Exchange {
                exchange: "kraken".into(),
                message: envelope.error.join("; "),
            });
        }
        envelope.result.ok_or_else(|| Error::Exchange {
            exchange: "kraken".into(),
            message: "response carried no result".into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct KrakenEnvelope<T> {
    error: Vec<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct KrakenBalances(HashMap<String, String>);

#[derive(Debug, Deserialize)]
struct KrakenAssetPair {
    base: String,
    quote: String,
    #[serde(rename = "pair_decimals")]
    pair_decimals: u32,
    #[serde(rename = "lot_decimals")]
    lot_decimals: u32,
    #[serde(rename = "ordermin")]
    ordermin: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct KrakenAssetPairs(HashMap<String, KrakenAssetPair>);

#[derive(Debug, Deserialize)]
struct KrakenAddOrderResult {
    txid: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KrakenOrderInfo {
    status: String,
    vol: String,
    vol_exec: String,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct KrakenOrdersQuery(HashMap<String, KrakenOrderInfo>);

#[async_trait]
impl ExchangeAdapter for KrakenAdapter {
    fn name(&self) -> &'static str {
        "kraken"
    }

    async fn get_balances(&self) -> Result<Wallet> {
        let balances: KrakenBalances = self.private("/0/private/Balance", Vec::new()).await?;
        let mut wallet = Wallet::new();
        for (asset, amount) in balances.0 {
            let available: Decimal = amount.parse().unwrap_or(Decimal::ZERO);
            wallet.set(from_venue_asset(&asset), Balance::new(available, Decimal::ZERO));
        }
        Ok(wallet)
    }

    async fn get_market_info(
        &self,
        markets: &[Market],
    ) -> Result<HashMap<Market, MarketInfo>> {
        let pairs: KrakenAssetPairs = self.public("/0/public/AssetPairs", &[]).await?;
        let wanted: HashSet<Market> = markets.iter().cloned().collect();
        let mut out = HashMap::new();
        for pair in pairs.0.into_values() {
            let market = Market::new(from_venue_asset(&pair.base), from_venue_asset(&pair.quote));
            if !wanted.contains(&market) {
                continue;
            }
            out.insert(
                market,
                MarketInfo {
                    trade_fee: Decimal::new(26, 4), // 0.0026, Kraken taker default
                    rate_precision: pair.pair_decimals,
                    volume_precision: pair.lot_decimals,
                    min_trade_volume: pair
                        .ordermin
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(Decimal::ZERO),
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
        let pair = format!(
            "{}{}",
            to_venue_asset(market.trade()),
            to_venue_asset(market.base())
        );
        let side_str = match side {
            Side::Buy => "buy",
            Side::Sell => "sell",
        };
        let params = vec![
            ("pair".into(), pair),
            ("type".into(), side_str.into()),
            ("ordertype".into(), "limit".into()),
            ("price".into(), rate.to_string()),
            ("volume".into(), volume.to_string()),
        ];
        let result: KrakenAddOrderResult = self.private("/0/private/AddOrder", params).await?;
        let txid = result
            .txid
            .into_iter()
            .next()
            .ok_or_else(|| Error::Exchange {
                exchange: "kraken".into(),
                message: "AddOrder returned no txid".into(),
            })?;
        debug!(order_id = %txid, %market, "placed kraken order");
        Ok(OrderId::new(txid))
    }

    async fn cancel_order(&self, order_id: &OrderId, _market: &Market) -> Result<()> {
        let params = vec![("txid".into(), order_id.as_str().to_string())];
        let _: serde_json::Value = self.private("/0/private/CancelOrder", params).await?;
        Ok(())
    }

    async fn get_order_data(&self, order_id: &OrderId, _market: &Market) -> Result<OrderStatus> {
        let params = vec![("txid".into(), order_id.as_str().to_string())];
        let orders: KrakenOrdersQuery = self.private("/0/private/QueryOrders", params).await?;
        let info = orders
            .0
            .get(order_id.as_str())
            .ok_or_else(|| Error::Exchange {
                exchange: "kraken".into(),
                message: format!("order {order_id} not found in QueryOrders response"),
            })?;
        let vol: Decimal = info.vol.parse().unwrap_or(Decimal::ZERO);
        let vol_exec: Decimal = info.vol_exec.parse().unwrap_or(Decimal::ZERO);
        Ok(OrderStatus {
            order_id: order_id.clone(),
            filled_qty: vol_exec,
            quantity_remaining: (vol - vol_exec).max(Decimal::ZERO),
            is_open: matches!(info.status.as_str(), "open" | "pending"),
        })
    }

    async fn discover_pairs(&self) -> Result<HashSet<(Currency, Currency)>> {
        let pairs: KrakenAssetPairs = self.public("/0/public/AssetPairs", &[]).await?;
        Ok(pairs
            .0
            .into_values()
            .map(|p| (from_venue_asset(&p.base), from_venue_asset(&p.quote)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xbt_maps_to_btc_and_back() {
        assert_eq!(to_venue_asset(&Currency::new("BTC")), "XBT");
        assert_eq!(from_venue_asset("XBT"), Currency::new("BTC"));
        assert_eq!(from_venue_asset("xbt"), Currency::new("BTC"));
    }

    #[test]
    fn non_btc_assets_pass_through_unchanged() {
        assert_eq!(to_venue_asset(&Currency::new("ETH")), "ETH");
        assert_eq!(from_venue_asset("ETH"), Currency::new("ETH"));
    }
}
