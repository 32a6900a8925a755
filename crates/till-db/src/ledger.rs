//! # Sales Ledger
//!
//! Read side of the append-only sales record. Appends only happen inside the
//! committer's atomic batch.
//!
//! ## Usage
//! ```rust,ignore
//! let ledger = SalesLedger::new(&db);
//!
//! // Lazy: rows are decoded as the stream is polled
//! let stream = ledger.query(&SaleFilter::for_salesperson("amy"));
//! tokio::pin!(stream);
//! while let Some(sale) = stream.next().await {
//!     let sale = sale?;
//!     println!("{} {}", sale.receipt_number, sale.total());
//! }
//! ```

use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::sale::SaleRepository;
use till_core::{CoreError, CoreResult, Sale, SaleFilter};

#[derive(Debug, Clone)]
pub struct SalesLedger {
    sales: SaleRepository,
}

impl SalesLedger {
    pub fn new(db: &Database) -> Self {
        SalesLedger { sales: db.sales() }
    }

    /// Lazily streams the sales matching `filter`.
    ///
    /// Callers must not rely on the order of the stream.
    pub fn query(&self, filter: &SaleFilter) -> impl Stream<Item = CoreResult<Sale>> + '_ {
        self.sales.stream(filter).map(|row| {
            row.map_err(|e| {
                error!(error = %e, "Ledger read failed");
                e.into_query_error()
            })
        })
    }

    /// Drains [`query`](Self::query) into a vector.
    pub async fn collect(&self, filter: &SaleFilter) -> CoreResult<Vec<Sale>> {
        let stream = self.query(filter);
        tokio::pin!(stream);

        let mut sales = Vec::new();
        while let Some(sale) = stream.next().await {
            sales.push(sale?);
        }

        debug!(count = sales.len(), "Collected sales");
        Ok(sales)
    }

    /// One sale by id.
    pub async fn get(&self, sale_id: &str) -> CoreResult<Sale> {
        self.sales
            .get_by_id(sale_id)
            .await
            .map_err(DbError::into_query_error)?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::committer::{CommitterConfig, TransactionCommitter};
    use crate::pool::DbConfig;
    use till_core::{Cart, GoodType, NewGood};

    async fn ledger_with_sales() -> (Database, SalesLedger, Vec<Sale>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let good = db
            .goods()
            .insert(&NewGood {
                product_id: "TEA".into(),
                name: "Green Tea".into(),
                price_cents: 300,
                cost_cents: 100,
                stock: 50,
                quantity: 0,
                good_type: GoodType::Retail,
            })
            .await
            .unwrap();

        let committer = TransactionCommitter::new(db.clone(), CommitterConfig::default());
        let mut sales = Vec::new();
        for (seller, qty) in [("amy", 1), ("bob", 2), ("amy", 3)] {
            let mut cart = Cart::new();
            cart.add(&good, qty).unwrap();
            sales.push(committer.commit(&mut cart, seller, 1000).await.unwrap().sale);
        }

        let ledger = SalesLedger::new(&db);
        (db, ledger, sales)
    }

    #[tokio::test]
    async fn test_collect_all_and_by_salesperson() {
        let (_db, ledger, sales) = ledger_with_sales().await;

        let all = ledger.collect(&SaleFilter::all()).await.unwrap();
        assert_eq!(all.len(), 3);

        let amy = ledger.collect(&SaleFilter::for_salesperson("amy")).await.unwrap();
        let mut ids: Vec<_> = amy.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        let mut expected = vec![sales[0].id.clone(), sales[2].id.clone()];
        expected.sort();
        assert_eq!(ids, expected);

        assert!(ledger
            .collect(&SaleFilter::for_salesperson("carol"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get() {
        let (_db, ledger, sales) = ledger_with_sales().await;

        assert_eq!(ledger.get(&sales[1].id).await.unwrap(), sales[1]);
        assert!(matches!(
            ledger.get("missing").await.unwrap_err(),
            CoreError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_closed_store_is_query_failed() {
        let (db, ledger, _) = ledger_with_sales().await;
        db.close().await;

        let err = ledger.collect(&SaleFilter::all()).await.unwrap_err();
        assert!(matches!(err, CoreError::QueryFailed(_)));
    }
}
