//! # Stock Store
//!
//! The persistence seam the transaction committer talks to.
//!
//! ## Atomic Batch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  atomic_batch([CreateSale(draft), UpdateStock(x), UpdateStock(y)])      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT INTO sales ... RETURNING receipt_number                       │
//! │    UPDATE goods SET stock = 3 WHERE id = x AND stock = 5   (1 row) ✓    │
//! │    UPDATE goods SET stock = 2 WHERE id = y AND stock = 3   (0 rows) ✗   │
//! │  ROLLBACK  →  Err(Conflict)   nothing from this batch is visible        │
//! │                                                                         │
//! │  All rows hit → COMMIT → Ok([sale])                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping the future mid-batch drops the transaction, which rolls back.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::good::GoodRepository;
use crate::repository::sale::SaleRepository;
use till_core::{BatchOp, Good, Sale};

/// Reads goods and applies all-or-nothing batches.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Current state of one good, `None` if it does not exist.
    async fn read_good(&self, good_id: &str) -> DbResult<Option<Good>>;

    /// Applies every op or none of them. Returns the sales created, in op
    /// order. A compare-and-swap miss yields `DbError::Conflict`.
    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> DbResult<Vec<Sale>>;
}

#[async_trait]
impl StockStore for Database {
    async fn read_good(&self, good_id: &str) -> DbResult<Option<Good>> {
        self.goods().get_by_id(good_id).await
    }

    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> DbResult<Vec<Sale>> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(format!("begin: {e}")))?;

        let now = Utc::now();
        let mut created = Vec::new();

        for op in &ops {
            let applied = match op {
                BatchOp::CreateSale(draft) => SaleRepository::insert_draft(&mut *tx, draft, now)
                    .await
                    .map(|sale| created.push(sale)),
                BatchOp::UpdateStock(adj) => GoodRepository::cas_stock(&mut *tx, adj).await,
            };

            if let Err(err) = applied {
                warn!(error = %err, "Batch rejected, rolling back");
                tx.rollback()
                    .await
                    .map_err(|e| DbError::TransactionFailed(format!("rollback: {e}")))?;
                return Err(err);
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(format!("commit: {e}")))?;

        debug!(ops = ops.len(), sales = created.len(), "Batch committed");
        Ok(created)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use till_core::{GoodType, NewGood, SaleDraft, SaleLine, StockAdjustment};

    async fn db_with(stock: &[(&str, i64)]) -> (Database, Vec<Good>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut goods = Vec::new();
        for (code, qty) in stock {
            let good = db
                .goods()
                .insert(&NewGood {
                    product_id: code.to_string(),
                    name: code.to_string(),
                    price_cents: 1000,
                    cost_cents: 500,
                    stock: *qty,
                    quantity: 0,
                    good_type: GoodType::Retail,
                })
                .await
                .unwrap();
            goods.push(good);
        }
        (db, goods)
    }

    fn draft(good: &Good, qty: i64) -> SaleDraft {
        SaleDraft {
            salesperson_id: "amy".into(),
            lines: vec![SaleLine {
                good_id: good.id.clone(),
                product_id: good.product_id.clone(),
                name: good.name.clone(),
                unit_price_cents: good.price_cents,
                cost_price_cents: good.cost_cents,
                quantity: qty,
            }],
            total_cents: good.price_cents * qty,
            amount_paid_cents: good.price_cents * qty,
            change_cents: 0,
        }
    }

    fn adjust(good: &Good, expected: i64, new: i64) -> BatchOp {
        BatchOp::UpdateStock(StockAdjustment {
            good_id: good.id.clone(),
            expected_stock: expected,
            new_stock: new,
        })
    }

    #[tokio::test]
    async fn test_batch_applies_everything() {
        let (db, goods) = db_with(&[("X", 5), ("Y", 3)]).await;
        let (x, y) = (&goods[0], &goods[1]);

        let sales = db
            .atomic_batch(vec![
                BatchOp::CreateSale(draft(x, 2)),
                adjust(x, 5, 3),
                adjust(y, 3, 2),
            ])
            .await
            .unwrap();

        assert_eq!(sales.len(), 1);
        assert_eq!(db.read_good(&x.id).await.unwrap().unwrap().stock, 3);
        assert_eq!(db.read_good(&y.id).await.unwrap().unwrap().stock, 2);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_conflict_mid_batch_rolls_back_earlier_ops() {
        let (db, goods) = db_with(&[("X", 5), ("Y", 3)]).await;
        let (x, y) = (&goods[0], &goods[1]);

        let err = db
            .atomic_batch(vec![
                BatchOp::CreateSale(draft(x, 2)),
                adjust(x, 5, 3),
                // Y was read as 4 but is really 3
                adjust(y, 4, 3),
            ])
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(db.read_good(&x.id).await.unwrap().unwrap().stock, 5);
        assert_eq!(db.read_good(&y.id).await.unwrap().unwrap().stock, 3);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_vanished_good_is_not_found() {
        let (db, goods) = db_with(&[("X", 5)]).await;
        let ghost = Good {
            id: "ghost".into(),
            ..goods[0].clone()
        };

        let err = db
            .atomic_batch(vec![adjust(&ghost, 5, 4)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_check_constraint_refuses_negative_stock() {
        let (db, goods) = db_with(&[("X", 1)]).await;
        let x = &goods[0];

        let err = db.atomic_batch(vec![adjust(x, 1, -1)]).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
        assert_eq!(db.read_good(&x.id).await.unwrap().unwrap().stock, 1);
    }
}
