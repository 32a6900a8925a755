//! # Sale Repository
//!
//! Database operations for the sales ledger.
//!
//! ## Ledger Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sales Ledger                                      │
//! │                                                                         │
//! │  APPEND   insert_draft()  only inside the committer's transaction      │
//! │           - id:              UUID v4                                    │
//! │           - receipt_number:  YYYYMMDD-NNNN (daily counter, UTC date)    │
//! │           - created_at:      commit time, millisecond precision         │
//! │                                                                         │
//! │  READ     stream(filter)  lazy, row by row                              │
//! │           get_by_id(id)                                                 │
//! │                                                                         │
//! │  UPDATE / DELETE   never (rejected by triggers in the schema)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line items are frozen into `items_json` so later catalog edits never
//! change what a past sale says it sold.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tokio_stream::{Stream, StreamExt};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::{Sale, SaleDraft, SaleFilter, SaleLine};

/// Every filter part is optional; a NULL parameter disables that part.
const SALE_QUERY_SQL: &str = r#"
    SELECT
        id, receipt_number, salesperson_id, items_json,
        total_cents, amount_paid_cents, change_cents, created_at_ms
    FROM sales
    WHERE (?1 IS NULL OR salesperson_id = ?1)
      AND (?2 IS NULL OR created_at_ms >= ?2)
      AND (?3 IS NULL OR created_at_ms < ?3)
    ORDER BY created_at_ms, receipt_number
"#;

/// Raw `sales` row. `items_json` and `created_at_ms` are decoded into
/// [`Sale`] by `TryFrom`.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    receipt_number: String,
    salesperson_id: String,
    items_json: String,
    total_cents: i64,
    amount_paid_cents: i64,
    change_cents: i64,
    created_at_ms: i64,
}

impl TryFrom<SaleRow> for Sale {
    type Error = DbError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        let lines: Vec<SaleLine> = serde_json::from_str(&row.items_json)?;
        let created_at = DateTime::from_timestamp_millis(row.created_at_ms).ok_or_else(|| {
            DbError::Serialization(format!(
                "sale {} has invalid timestamp {}",
                row.id, row.created_at_ms
            ))
        })?;

        Ok(Sale {
            id: row.id,
            receipt_number: row.receipt_number,
            salesperson_id: row.salesperson_id,
            lines,
            total_cents: row.total_cents,
            amount_paid_cents: row.amount_paid_cents,
            change_cents: row.change_cents,
            created_at,
        })
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT
                id, receipt_number, salesperson_id, items_json,
                total_cents, amount_paid_cents, change_cents, created_at_ms
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Sale::try_from).transpose()
    }

    /// Streams the sales matching `filter`, one row at a time.
    ///
    /// Rows are decoded lazily as the stream is polled; nothing is buffered.
    pub fn stream(&self, filter: &SaleFilter) -> impl Stream<Item = DbResult<Sale>> + '_ {
        let (from_ms, until_ms) = match &filter.range {
            Some(range) => (
                Some(range.start.timestamp_millis()),
                Some(range.end.timestamp_millis()),
            ),
            None => (None, None),
        };

        debug!(
            salesperson = ?filter.salesperson_id,
            from_ms = ?from_ms,
            until_ms = ?until_ms,
            "Streaming sales"
        );

        sqlx::query_as::<_, SaleRow>(SALE_QUERY_SQL)
            .bind(filter.salesperson_id.clone())
            .bind(from_ms)
            .bind(until_ms)
            .fetch(&self.pool)
            .map(|row| row.map_err(DbError::from).and_then(Sale::try_from))
    }

    /// Number of sales in the ledger.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Appends a sale on the given connection (the committer's transaction).
    ///
    /// The receipt number is computed by the INSERT itself so the daily
    /// counter is read under the same write lock that records the sale.
    pub(crate) async fn insert_draft(
        conn: &mut SqliteConnection,
        draft: &SaleDraft,
        now: DateTime<Utc>,
    ) -> DbResult<Sale> {
        let id = Uuid::new_v4().to_string();
        let created_at_ms = now.timestamp_millis();
        let created_at = DateTime::from_timestamp_millis(created_at_ms).unwrap_or(now);
        let date_prefix = created_at.format("%Y%m%d").to_string();
        let items_json = serde_json::to_string(&draft.lines)?;

        debug!(sale_id = %id, lines = draft.lines.len(), "Appending sale");

        let receipt_number: String = sqlx::query_scalar(
            r#"
            INSERT INTO sales (
                id, receipt_number, salesperson_id, items_json,
                total_cents, amount_paid_cents, change_cents, created_at_ms
            ) VALUES (
                ?1,
                ?2 || '-' || printf('%04d',
                    (SELECT COUNT(*) FROM sales WHERE receipt_number LIKE ?2 || '-%') + 1),
                ?3, ?4, ?5, ?6, ?7, ?8
            )
            RETURNING receipt_number
            "#,
        )
        .bind(&id)
        .bind(&date_prefix)
        .bind(&draft.salesperson_id)
        .bind(&items_json)
        .bind(draft.total_cents)
        .bind(draft.amount_paid_cents)
        .bind(draft.change_cents)
        .bind(created_at_ms)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Sale {
            id,
            receipt_number,
            salesperson_id: draft.salesperson_id.clone(),
            lines: draft.lines.clone(),
            total_cents: draft.total_cents,
            amount_paid_cents: draft.amount_paid_cents,
            change_cents: draft.change_cents,
            created_at,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use till_core::DateRange;

    fn draft(salesperson: &str, total: i64) -> SaleDraft {
        SaleDraft {
            salesperson_id: salesperson.to_string(),
            lines: vec![SaleLine {
                good_id: "g1".into(),
                product_id: "RICE-5KG".into(),
                name: "Rice 5kg".into(),
                unit_price_cents: total,
                cost_price_cents: total / 2,
                quantity: 1,
            }],
            total_cents: total,
            amount_paid_cents: total,
            change_cents: 0,
        }
    }

    async fn append(db: &Database, d: &SaleDraft, at: DateTime<Utc>) -> Sale {
        let mut conn = db.pool().acquire().await.unwrap();
        SaleRepository::insert_draft(&mut *conn, d, at).await.unwrap()
    }

    async fn collect(db: &Database, filter: &SaleFilter) -> Vec<Sale> {
        let repo = db.sales();
        let stream = repo.stream(filter);
        tokio::pin!(stream);
        let mut out = Vec::new();
        while let Some(sale) = stream.next().await {
            out.push(sale.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let sale = append(&db, &draft("amy", 1500), at).await;

        let stored = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored, sale);
        assert_eq!(stored.created_at, at);
        assert!(db.sales().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_receipt_numbers_count_per_day() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let day1 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();

        let a = append(&db, &draft("amy", 100), day1).await;
        let b = append(&db, &draft("amy", 100), day1).await;
        let c = append(&db, &draft("amy", 100), day2).await;

        assert_eq!(a.receipt_number, "20260301-0001");
        assert_eq!(b.receipt_number, "20260301-0002");
        assert_eq!(c.receipt_number, "20260302-0001");
    }

    #[tokio::test]
    async fn test_stream_filters_by_salesperson_and_range() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let day1 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();

        append(&db, &draft("amy", 100), day1).await;
        append(&db, &draft("bob", 200), day1).await;
        append(&db, &draft("amy", 300), day2).await;

        assert_eq!(collect(&db, &SaleFilter::all()).await.len(), 3);

        let amy = collect(&db, &SaleFilter::for_salesperson("amy")).await;
        assert_eq!(amy.len(), 2);
        assert!(amy.iter().all(|s| s.salesperson_id == "amy"));

        let range = DateRange::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
        );
        let day_one_amy = collect(&db, &SaleFilter::for_salesperson("amy").with_range(range)).await;
        assert_eq!(day_one_amy.len(), 1);
        assert_eq!(day_one_amy[0].total_cents, 100);
    }

    #[tokio::test]
    async fn test_ledger_rejects_updates_and_deletes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = append(&db, &draft("amy", 100), Utc::now()).await;

        let update = sqlx::query("UPDATE sales SET total_cents = 0 WHERE id = ?1")
            .bind(&sale.id)
            .execute(db.pool())
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(&sale.id)
            .execute(db.pool())
            .await;
        assert!(delete.is_err());

        assert_eq!(db.sales().count().await.unwrap(), 1);
    }
}
