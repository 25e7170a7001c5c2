//! Wires configuration, exchange adapters, shared stores, and background
//! tasks together into one running engine.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::domain::{Market, MarketInfo};
use crate::core::exchange::{
    run_with_reconnect, BinanceAdapter, BinanceBookStream, ExchangeAdapter, KrakenAdapter, KrakenBookStream,
};
use crate::core::persistence::{PersistenceBackend, SqlitePersistence};
use crate::core::routing::RouteBuilder;
use crate::core::scanner::{self, Context};
use crate::core::store::{
    LiveStore, MarketInfoStore, OpportunityStore, OrderBookStore, RouteList, StatusFile, StatusSnapshot, WalletStore,
};
use crate::error::Result;

/// How often the running engine refreshes its on-disk `StatusFile`.
const STATUS_WRITE_INTERVAL: Duration = Duration::from_secs(5);

pub struct App;

impl App {
    /// Bootstraps market data and wallets for both venues, then runs the
    /// scanner loop until `ctrl_c` is received.
    pub async fn run(config: Config) -> Result<()> {
        config.init_logging();
        info!(dry_run = config.dry_run, currencies = ?config.currencies, "starting arby");

        let binance: Arc<dyn ExchangeAdapter> = Arc::new(BinanceAdapter::new(config.binance.clone()));
        let kraken: Arc<dyn ExchangeAdapter> = Arc::new(KrakenAdapter::new(config.kraken.clone()));

        let active_markets = discover_active_markets(&binance, &kraken, &config).await?;
        info!(count = active_markets.len(), "active markets resolved across both venues");

        let market_info = MarketInfoStore::new();
        load_market_info(&market_info, binance.as_ref(), &active_markets).await?;
        load_market_info(&market_info, kraken.as_ref(), &active_markets).await?;

        let wallets = WalletStore::new();
        refresh_wallet(&wallets, binance.as_ref()).await;
        refresh_wallet(&wallets, kraken.as_ref()).await;

        let routes = RouteBuilder::new(config.currencies.clone(), active_markets.clone(), config.currency_bases.clone()).build();
        info!(count = routes.len(), "route set built");

        let books = Arc::new(OrderBookStore::new());
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        let markets: Vec<Market> = active_markets.into_iter().collect();
        let binance_stream = BinanceBookStream::new(markets.clone(), books.clone());
        let kraken_stream = KrakenBookStream::new(markets, books.clone());

        let binance_task = tokio::spawn(run_with_reconnect(binance_stream, shutdown_rx.clone()));
        let kraken_task = tokio::spawn(run_with_reconnect(kraken_stream, shutdown_rx.clone()));

        let persistence: Arc<dyn PersistenceBackend> = Arc::new(SqlitePersistence::connect(&config.database_path)?);

        let mut adapters: HashMap<String, Arc<dyn ExchangeAdapter>> = HashMap::new();
        adapters.insert(binance.name().to_string(), binance);
        adapters.insert(kraken.name().to_string(), kraken);

        let ctx = Arc::new(Context {
            adapters,
            books,
            wallets,
            market_info,
            live: LiveStore::new(),
            routes: RouteList::new(routes),
            opportunities: OpportunityStore::new(),
            persistence,
            min_profit: config.min_profit,
            dry_run: config.dry_run,
            last_tick: RwLock::new(0.0),
        });

        let status_path = PathBuf::from(config.status_path.clone());
        let status_task = tokio::spawn(write_status_periodically(ctx.clone(), status_path, shutdown_rx.clone()));

        let scan_task = tokio::spawn(scanner::run(ctx, shutdown_rx));

        tokio::signal::ctrl_c().await.map_err(crate::error::Error::Io)?;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);

        let _ = tokio::join!(binance_task, kraken_task, scan_task, status_task);
        Ok(())
    }
}

/// Refreshes the on-disk status snapshot on [`STATUS_WRITE_INTERVAL`]
/// until shutdown, so `arby status` has something recent to read.
async fn write_status_periodically(
    ctx: Arc<Context>,
    path: PathBuf,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let started_at = chrono::Utc::now();
    let mut interval = tokio::time::interval(STATUS_WRITE_INTERVAL);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let snapshot = StatusSnapshot::capture(
                    &ctx.routes,
                    &ctx.live,
                    &ctx.wallets,
                    &ctx.opportunities,
                    *ctx.last_tick.read(),
                );
                let file = StatusFile::new(started_at, snapshot);
                if let Err(e) = file.write_to(&path) {
                    warn!(error = %e, path = %path.display(), "failed to write status file");
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}

/// Markets listed on both venues, intersected with the selected currency
/// set: a market qualifies if either side is a currency we trade.
async fn discover_active_markets(
    binance: &Arc<dyn ExchangeAdapter>,
    kraken: &Arc<dyn ExchangeAdapter>,
    config: &Config,
) -> Result<HashSet<Market>> {
    let binance_pairs = binance.discover_pairs().await?;
    let kraken_pairs = kraken.discover_pairs().await?;

    let selected: HashSet<_> = config.currencies.iter().collect();
    let markets = binance_pairs
        .intersection(&kraken_pairs)
        .filter(|(trade, base)| selected.contains(trade) || selected.contains(base))
        .map(|(trade, base)| Market::new(trade.clone(), base.clone()))
        .collect();

    Ok(markets)
}

async fn load_market_info(store: &MarketInfoStore, adapter: &dyn ExchangeAdapter, markets: &HashSet<Market>) -> Result<()> {
    let markets: Vec<Market> = markets.iter().cloned().collect();
    let info: HashMap<Market, MarketInfo> = adapter.get_market_info(&markets).await?;
    for (market, info) in info {
        store.set(adapter.name(), market, info);
    }
    Ok(())
}

async fn refresh_wallet(store: &WalletStore, adapter: &dyn ExchangeAdapter) {
    match adapter.get_balances().await {
        Ok(wallet) => store.replace(adapter.name(), wallet),
        Err(e) => warn!(exchange = adapter.name(), error = %e, "initial wallet fetch failed"),
    }
}
