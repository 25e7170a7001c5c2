//! The out-of-core relational persistence contract. Every scan tick
//! writes its `Opportunity` to the in-process `OpportunityStore`
//! unconditionally, then hands the same record to whatever
//! `PersistenceBackend` is configured — `SqlitePersistence` by default,
//! `NullPersistence` for dry-run and test runs so the scanner never
//! blocks on a missing database.

use crate::core::domain::Opportunity;
use crate::error::Result;

use super::model::{NewBalanceRow, NewOpportunityRow, NewOrderDetailRow, NewOrderRow};

pub trait PersistenceBackend: Send + Sync {
    fn record_opportunity(&self, opportunity: &Opportunity) -> Result<()>;

    /// Persists one order header plus its filled sub-legs, returning the
    /// order's assigned row id.
    fn record_order(&self, order: &NewOrderRow, details: &[NewOrderDetailRow]) -> Result<i32>;

    fn record_balances(&self, rows: &[NewBalanceRow]) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullPersistence;

impl PersistenceBackend for NullPersistence {
    fn record_opportunity(&self, _opportunity: &Opportunity) -> Result<()> {
        Ok(())
    }

    fn record_order(&self, _order: &NewOrderRow, _details: &[NewOrderDetailRow]) -> Result<i32> {
        Ok(0)
    }

    fn record_balances(&self, _rows: &[NewBalanceRow]) -> Result<()> {
        Ok(())
    }
}

impl From<&Opportunity> for NewOpportunityRow {
    fn from(o: &Opportunity) -> Self {
        Self {
            ts: o.ts.to_string(),
            route_type: o.route_type.as_str().to_string(),
            route_label: o.route_label.clone(),
            buy_exchange: o.buy_exchange.clone(),
            sell_exchange: o.sell_exchange.clone(),
            spread_pct: o.spread_pct.to_string(),
            buy_rate: o.buy_rate.to_string(),
            sell_rate: o.sell_rate.to_string(),
            cross_rate: o.cross_rate.map(|r| r.to_string()),
            qty_a: o.qty_a.to_string(),
            qty_b: o.qty_b.to_string(),
            executed: o.executed,
            dry_run: o.dry_run,
        }
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
    fn null_persistence_never_errors() {
        let backend = NullPersistence;
        assert!(backend.record_opportunity(&opportunity()).is_ok());
        assert!(backend
            .record_order(
                &NewOrderRow { ts: "0".into(), market: "ETHBTC".into() },
                &[]
            )
            .is_ok());
        assert!(backend.record_balances(&[]).is_ok());
    }

    #[test]
    fn opportunity_row_conversion_stringifies_decimals() {
        let row = NewOpportunityRow::from(&opportunity());
        assert_eq!(row.buy_rate, "0.05");
        assert_eq!(row.cross_rate, None);
        assert_eq!(row.route_type, "direct");
    }
}
