//! Handler for the `status` command.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;
use tabled::{Table, Tabled};

use crate::config::Config;
use crate::core::store::StatusFile;

/// A status file older than this is treated as stale, most likely left
/// behind by a process that crashed without writing a final update.
const STALE_AFTER: Duration = Duration::minutes(1);

/// Execute the status command: read the file the running engine writes
/// on [`crate::app`]'s status interval, and print it once.
pub fn execute() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error loading configuration: {e}");
            return;
        }
    };

    match StatusFile::read_from(Path::new(&config.status_path)) {
        Some(status) if !is_stale(&status) => display(&status),
        Some(status) => {
            println!("arby status file at {} is stale (last updated {})", config.status_path, status.updated_at);
            println!("the engine is probably not running; start it with `arby run`");
        }
        None => {
            println!("no status file found at {}", config.status_path);
            println!("start the engine with `arby run` to populate one");
        }
    }
}

fn is_stale(status: &StatusFile) -> bool {
    status.updated_at < Utc::now() - STALE_AFTER
}

fn format_uptime(started_at: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(started_at);
    let total_minutes = duration.num_minutes();
    if total_minutes < 0 {
        return "just started".to_string();
    }

    let days = duration.num_days();
    let hours = duration.num_hours() % 24;
    let minutes = total_minutes % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "Route")]
    label: String,
    #[tabled(rename = "Buy")]
    buy_exchange: String,
    #[tabled(rename = "Sell")]
    sell_exchange: String,
    #[tabled(rename = "Last")]
    last_score: String,
    #[tabled(rename = "Best seen")]
    highest_seen: String,
    #[tabled(rename = ">0.5%")]
    over_0_5_pct: u64,
    #[tabled(rename = ">1%")]
    over_1_pct: u64,
}

fn display(status: &StatusFile) {
    let version = env!("CARGO_PKG_VERSION");
    let snapshot = &status.snapshot;

    println!();
    println!("arby v{version} \u{2014} pid {}, up {}", status.pid, format_uptime(status.started_at));
    println!("routes tracked: {}   opportunities logged: {}", snapshot.route_count, snapshot.opportunities_logged);
    println!("last tick: {:.3}s (unix)", snapshot.last_tick);
    println!();

    if snapshot.routes.is_empty() {
        println!("no route comparisons recorded yet");
    } else {
        let rows: Vec<RouteRow> = snapshot
            .routes
            .iter()
            .map(|r| RouteRow {
                label: r.label.clone(),
                buy_exchange: r.buy_exchange.clone(),
                sell_exchange: r.sell_exchange.clone(),
                last_score: format!("{:.4}%", r.last_score * dec!(100)),
                highest_seen: format!("{:.4}%", r.highest_seen * dec!(100)),
                over_0_5_pct: r.histogram.over_0_5_pct,
                over_1_pct: r.histogram.over_1_pct,
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    println!();
    for wallet in &snapshot.wallets {
        let balances = wallet
            .balances
            .iter()
            .map(|(currency, available)| format!("{currency}={available}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("{}: {}", wallet.exchange, balances);
    }
    println!();
}
