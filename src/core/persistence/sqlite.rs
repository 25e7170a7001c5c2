//! The default `PersistenceBackend`: a `diesel` + `r2d2` SQLite pool.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::core::domain::Opportunity;
use crate::error::{Error, Result};

use super::model::{NewBalanceRow, NewOpportunityRow, NewOrderDetailRow, NewOrderRow};
use super::schema::{balances, opportunities, order_details, orders};
use super::sink::PersistenceBackend;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Opens (creating if necessary) a SQLite database at `database_url` and
/// runs any pending migrations. `database_url` is a plain file path or
/// `:memory:`; the `DB_HOST`/`DB_PORT`/... environment variables are not
/// consumed here (see DESIGN.md).
pub struct SqlitePersistence {
    pool: DbPool,
}

impl SqlitePersistence {
    pub fn connect(database_url: &str) -> Result<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(5)
            .build(manager)
            .map_err(|e| Error::Connection(e.to_string()))?;

        let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(Self { pool })
    }
}

impl PersistenceBackend for SqlitePersistence {
    fn record_opportunity(&self, opportunity: &Opportunity) -> Result<()> {
        let mut conn = self.pool.get().map_err(|e| Error::Connection(e.to_string()))?;
        let row = NewOpportunityRow::from(opportunity);
        diesel::insert_into(opportunities::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    fn record_order(&self, order: &NewOrderRow, details: &[NewOrderDetailRow]) -> Result<i32> {
        let mut conn = self.pool.get().map_err(|e| Error::Connection(e.to_string()))?;
        conn.transaction(|conn| {
            diesel::insert_into(orders::table)
                .values(order)
                .execute(conn)?;
            let order_id: i32 = orders::table
                .select(orders::id)
                .order(orders::id.desc())
                .first(conn)?;

            for detail in details {
                let mut detail = detail.clone();
                detail.order_id = order_id;
                diesel::insert_into(order_details::table)
                    .values(&detail)
                    .execute(conn)?;
            }

            Ok(order_id)
        })
        .map_err(|e: diesel::result::Error| Error::Database(e.to_string()))
    }

    fn record_balances(&self, rows: &[NewBalanceRow]) -> Result<()> {
        let mut conn = self.pool.get().map_err(|e| Error::Connection(e.to_string()))?;
        diesel::insert_into(balances::table)
            .values(rows)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::RouteType;
    use rust_decimal_macros::dec;

    fn opportunity() -> Opportunity {
        Opportunity {
            ts: 1_700_000_000.0,
            route_type: RouteType::Direct,
            route_label: "ETHBTC".into(),
            buy_exchange: "kraken".into(),
            sell_exchange: "binance".into(),
            spread_pct: dec!(0.01),
            buy_rate: dec!(0.05),
            sell_rate: dec!(0.0505),
            cross_rate: None,
            qty_a: dec!(1),
            qty_b: dec!(1),
            executed: false,
            dry_run: true,
        }
    }

    #[test]
    fn connect_runs_migrations_against_an_in_memory_db() {
        let backend = SqlitePersistence::connect(":memory:").unwrap();
        assert!(backend.record_opportunity(&opportunity()).is_ok());
    }

    #[test]
    fn record_order_assigns_sub_legs_to_the_right_order_id() {
        let backend = SqlitePersistence::connect(":memory:").unwrap();
        let order = NewOrderRow {
            ts: "1700000000".into(),
            market: "ETHBTC".into(),
        };
        let details = vec![NewOrderDetailRow {
            order_id: 0,
            volume: "1".into(),
            rate: "0.05".into(),
            orig_id: "abc123".into(),
            exchange: "binance".into(),
            side: "buy".into(),
        }];
        let order_id = backend.record_order(&order, &details).unwrap();
        assert!(order_id > 0);
    }

    #[test]
    fn record_balances_inserts_every_row() {
        let backend = SqlitePersistence::connect(":memory:").unwrap();
        let rows = vec![NewBalanceRow {
            currency: "BTC".into(),
            balance: "1.5".into(),
            ts: "1700000000".into(),
        }];
        assert!(backend.record_balances(&rows).is_ok());
    }
}
