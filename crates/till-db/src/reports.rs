//! # Reports
//!
//! Joins ledger reads with the pure aggregator in `till_core::metrics`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  metrics(salesperson?, date?)                                          │
//! │     │                                                                   │
//! │     ├── date → zone.day_bounds(date) → SaleFilter range                │
//! │     ├── SalesLedger::collect(filter)                                   │
//! │     │      └── Err → warn!, zero snapshot                              │
//! │     └── compute_metrics(sales, zone, date)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::ledger::SalesLedger;
use crate::pool::Database;
use till_core::metrics::{compute_metrics, sales_history};
use till_core::{CoreResult, DailySales, DateRange, MetricsSnapshot, ReportingZone, SaleFilter};

#[derive(Debug, Clone)]
pub struct ReportService {
    ledger: SalesLedger,
    zone: ReportingZone,
}

impl ReportService {
    pub fn new(db: &Database, zone: ReportingZone) -> Self {
        ReportService {
            ledger: SalesLedger::new(db),
            zone,
        }
    }

    /// Metrics for one salesperson (or everyone), optionally one date.
    ///
    /// An unreadable ledger yields the zero snapshot.
    pub async fn metrics(&self, salesperson: Option<&str>, date: Option<NaiveDate>) -> MetricsSnapshot {
        let filter = self.filter(salesperson, date);
        match self.ledger.collect(&filter).await {
            Ok(sales) => {
                debug!(count = sales.len(), "Computing metrics");
                compute_metrics(&sales, self.zone, date)
            }
            Err(err) => {
                warn!(error = %err, "Ledger unreadable, reporting zero metrics");
                MetricsSnapshot::empty()
            }
        }
    }

    /// Per-day breakdown in date order.
    pub async fn history(
        &self,
        salesperson: Option<&str>,
        date: Option<NaiveDate>,
    ) -> CoreResult<Vec<DailySales>> {
        let filter = self.filter(salesperson, date);
        let sales = self.ledger.collect(&filter).await?;
        Ok(sales_history(&sales, self.zone, date))
    }

    fn filter(&self, salesperson: Option<&str>, date: Option<NaiveDate>) -> SaleFilter {
        let mut filter = match salesperson {
            Some(id) => SaleFilter::for_salesperson(id),
            None => SaleFilter::all(),
        };
        if let Some((start, end)) = date.and_then(|d| self.zone.day_bounds(d)) {
            filter = filter.with_range(DateRange::new(start, end));
        }
        filter
    }
}
