//! # Sales Metrics
//!
//! Pure aggregation over a slice of committed sales.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  &[Sale]                                                                │
//! │     │                                                                   │
//! │     ▼  group_by_date(zone)                                              │
//! │  BTreeMap<NaiveDate, DailySales>      (date key in a fixed UTC offset)  │
//! │     │                                                                   │
//! │     ▼  optional date filter: keep only that key                         │
//! │  compute_metrics                                                        │
//! │     ├── total / count / average (integer cents, truncating)             │
//! │     ├── per-item revenue, quantity, profit (keyed by item name)         │
//! │     └── top 3 items by revenue (stable: first seen wins ties)           │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  MetricsSnapshot                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are visited in date-key order, then in the order they were given
//! within a date. "First seen" for tie-breaking follows that visit order.
//! The same input always produces the same snapshot.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Sale;
use crate::TOP_SELLING_LIMIT;

// =============================================================================
// Reporting Zone
// =============================================================================

/// Fixed UTC offset used to turn a commit timestamp into a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingZone(FixedOffset);

impl ReportingZone {
    pub fn utc() -> Self {
        ReportingZone(Utc.fix())
    }

    /// Offset east of UTC in minutes. `None` if outside ±24h.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(ReportingZone)
    }

    pub fn offset(&self) -> FixedOffset {
        self.0
    }

    /// Calendar date of `at` in this zone.
    pub fn date_key(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.0).date_naive()
    }

    /// UTC instants bounding `date` in this zone: `[start, end)`.
    pub fn day_bounds(&self, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = date
            .and_hms_opt(0, 0, 0)?
            .and_local_timezone(self.0)
            .single()?
            .with_timezone(&Utc);
        Some((start, start + chrono::Duration::days(1)))
    }
}

impl Default for ReportingZone {
    fn default() -> Self {
        ReportingZone::utc()
    }
}

// =============================================================================
// Output Types
// =============================================================================

/// Sales committed on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: Vec<Sale>,
    pub total_amount_cents: i64,
}

/// Aggregate for one item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSales {
    pub name: String,
    pub quantity_sold: i64,
    pub total_amount_cents: i64,
    pub total_profit_cents: i64,
}

/// Derived performance figures. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_sales_cents: i64,
    pub average_sale_cents: i64,
    pub total_sales_count: u64,
    pub total_profit_cents: i64,
    pub top_selling_items: Vec<ItemSales>,
}

impl MetricsSnapshot {
    /// All zeros, no items.
    pub fn empty() -> Self {
        MetricsSnapshot::default()
    }

    pub fn total_sales(&self) -> Money {
        Money::from_cents(self.total_sales_cents)
    }

    pub fn average_sale(&self) -> Money {
        Money::from_cents(self.average_sale_cents)
    }

    pub fn total_profit(&self) -> Money {
        Money::from_cents(self.total_profit_cents)
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Groups sales by the calendar date of their commit timestamp.
pub fn group_by_date(sales: &[Sale], zone: ReportingZone) -> BTreeMap<NaiveDate, DailySales> {
    let mut grouped: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();

    for sale in sales {
        let date = zone.date_key(sale.created_at);
        let day = grouped.entry(date).or_insert_with(|| DailySales {
            date,
            sales: Vec::new(),
            total_amount_cents: 0,
        });
        day.total_amount_cents += sale.total_cents;
        day.sales.push(sale.clone());
    }

    grouped
}

/// Daily breakdown in date order, optionally restricted to one date.
pub fn sales_history(
    sales: &[Sale],
    zone: ReportingZone,
    date: Option<NaiveDate>,
) -> Vec<DailySales> {
    let mut grouped = group_by_date(sales, zone);
    match date {
        Some(d) => grouped.remove(&d).into_iter().collect(),
        None => grouped.into_values().collect(),
    }
}

/// Computes the metrics snapshot for `sales`, optionally restricted to one
/// calendar date in `zone`.
///
/// ## Example
/// ```rust
/// use till_core::metrics::{compute_metrics, ReportingZone};
///
/// let snapshot = compute_metrics(&[], ReportingZone::utc(), None);
/// assert_eq!(snapshot.total_sales_count, 0);
/// assert_eq!(snapshot.average_sale_cents, 0);
/// ```
pub fn compute_metrics(
    sales: &[Sale],
    zone: ReportingZone,
    date: Option<NaiveDate>,
) -> MetricsSnapshot {
    let days = sales_history(sales, zone, date);

    let mut total = Money::zero();
    let mut count: u64 = 0;
    let mut items: Vec<ItemSales> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sale in days.iter().flat_map(|d| d.sales.iter()) {
        total += sale.total();
        count += 1;

        for line in &sale.lines {
            let slot = match index.get(&line.name) {
                Some(i) => *i,
                None => {
                    index.insert(line.name.clone(), items.len());
                    items.push(ItemSales {
                        name: line.name.clone(),
                        quantity_sold: 0,
                        total_amount_cents: 0,
                        total_profit_cents: 0,
                    });
                    items.len() - 1
                }
            };
            let item = &mut items[slot];
            item.quantity_sold += line.quantity;
            item.total_amount_cents += line.line_total().cents();
            item.total_profit_cents += line.line_profit().cents();
        }
    }

    let total_profit_cents = items.iter().map(|i| i.total_profit_cents).sum();

    // sort_by is stable, so equal revenue keeps first-seen order
    items.sort_by(|a, b| b.total_amount_cents.cmp(&a.total_amount_cents));
    items.truncate(TOP_SELLING_LIMIT);

    MetricsSnapshot {
        total_sales_cents: total.cents(),
        average_sale_cents: total.divide_by_count(count).cents(),
        total_sales_count: count,
        total_profit_cents,
        top_selling_items: items,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleLine;
    use chrono::TimeZone;

    fn line(name: &str, price: i64, cost: i64, qty: i64) -> SaleLine {
        SaleLine {
            good_id: format!("id-{name}"),
            product_id: format!("P-{name}"),
            name: name.to_string(),
            unit_price_cents: price,
            cost_price_cents: cost,
            quantity: qty,
        }
    }

    fn sale(lines: Vec<SaleLine>, at: DateTime<Utc>) -> Sale {
        let total = lines.iter().map(|l| l.line_total().cents()).sum();
        Sale {
            id: uuid::Uuid::new_v4().to_string(),
            receipt_number: "20260301-0001".into(),
            salesperson_id: "amy".into(),
            lines,
            total_cents: total,
            amount_paid_cents: total,
            change_cents: 0,
            created_at: at,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_single_item_across_three_sales() {
        let sales = vec![
            sale(vec![line("Z", 1500, 500, 2)], at(1, 9)),
            sale(vec![line("Z", 1500, 500, 3)], at(1, 12)),
            sale(vec![line("Z", 1500, 500, 1)], at(1, 17)),
        ];

        let m = compute_metrics(&sales, ReportingZone::utc(), None);

        assert_eq!(m.top_selling_items.len(), 1);
        let z = &m.top_selling_items[0];
        assert_eq!(z.quantity_sold, 6);
        assert_eq!(z.total_amount_cents, 9000);
        assert_eq!(z.total_profit_cents, 6000);
        assert_eq!(m.total_profit_cents, 6000);
        assert_eq!(m.total_sales_count, 3);
        assert_eq!(m.average_sale_cents, 3000);
    }

    #[test]
    fn test_empty_slice_is_all_zero() {
        let m = compute_metrics(&[], ReportingZone::utc(), None);
        assert_eq!(m, MetricsSnapshot::empty());
    }

    #[test]
    fn test_average_truncates() {
        let sales = vec![
            sale(vec![line("A", 1000, 0, 1)], at(1, 9)),
            sale(vec![line("A", 1000, 0, 1)], at(1, 10)),
            sale(vec![line("B", 1, 0, 1)], at(1, 11)),
        ];
        let m = compute_metrics(&sales, ReportingZone::utc(), None);
        assert_eq!(m.total_sales_cents, 2001);
        assert_eq!(m.average_sale_cents, 667);
    }

    #[test]
    fn test_top_items_sorted_truncated_and_stable() {
        let sales = vec![sale(
            vec![
                line("tie-first", 500, 0, 1),
                line("big", 9000, 0, 1),
                line("tie-second", 500, 0, 1),
                line("mid", 2000, 0, 1),
                line("small", 100, 0, 1),
            ],
            at(2, 9),
        )];

        let m = compute_metrics(&sales, ReportingZone::utc(), None);
        let names: Vec<&str> = m
            .top_selling_items
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["big", "mid", "tie-first"]);
        assert!(m
            .top_selling_items
            .windows(2)
            .all(|w| w[0].total_amount_cents >= w[1].total_amount_cents));

        // Profit covers every item, not just the top three.
        assert_eq!(m.total_profit_cents, 500 + 9000 + 500 + 2000 + 100);
    }

    #[test]
    fn test_date_filter_restricts_to_one_day() {
        let sales = vec![
            sale(vec![line("A", 1000, 0, 1)], at(1, 9)),
            sale(vec![line("A", 1000, 0, 2)], at(2, 9)),
        ];
        let day2 = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        let m = compute_metrics(&sales, ReportingZone::utc(), Some(day2));
        assert_eq!(m.total_sales_count, 1);
        assert_eq!(m.total_sales_cents, 2000);

        let none = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let m = compute_metrics(&sales, ReportingZone::utc(), Some(none));
        assert_eq!(m, MetricsSnapshot::empty());
    }

    #[test]
    fn test_zone_moves_late_sale_to_next_day() {
        // 23:30 UTC on the 1st is 00:30 on the 2nd at UTC+1.
        let late = Utc.with_ymd_and_hms(2026, 3, 1, 23, 30, 0).unwrap();
        let sales = vec![sale(vec![line("A", 1000, 0, 1)], late)];

        let utc = group_by_date(&sales, ReportingZone::utc());
        assert!(utc.contains_key(&NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));

        let plus_one = ReportingZone::from_offset_minutes(60).unwrap();
        let shifted = group_by_date(&sales, plus_one);
        assert!(shifted.contains_key(&NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()));
    }

    #[test]
    fn test_sales_history_in_date_order_with_daily_totals() {
        let sales = vec![
            sale(vec![line("A", 1000, 0, 1)], at(3, 9)),
            sale(vec![line("A", 1000, 0, 1)], at(1, 9)),
            sale(vec![line("A", 1000, 0, 2)], at(1, 15)),
        ];
        let history = sales_history(&sales, ReportingZone::utc(), None);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(history[0].total_amount_cents, 3000);
        assert_eq!(history[0].sales.len(), 2);
        assert_eq!(history[1].total_amount_cents, 1000);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let sales = vec![
            sale(vec![line("A", 700, 100, 2), line("B", 300, 100, 5)], at(1, 9)),
            sale(vec![line("B", 300, 100, 1), line("C", 1400, 900, 1)], at(2, 9)),
        ];
        let first = compute_metrics(&sales, ReportingZone::utc(), None);
        let second = compute_metrics(&sales, ReportingZone::utc(), None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_day_bounds() {
        let zone = ReportingZone::from_offset_minutes(60).unwrap();
        let (start, end) = zone
            .day_bounds(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).unwrap());
        assert_eq!(end - start, chrono::Duration::days(1));
    }
}
