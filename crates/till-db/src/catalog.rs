//! # Catalog
//!
//! Read access to the goods a till can sell, plus provisioning of new goods.
//!
//! Stock is never written here. The only stock write after a good exists is
//! the committer's compare-and-swap update.
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bad input (query too long, threshold ≤ 0)  →  CoreError::Validation   │
//! │  unknown id                                 →  CoreError::NotFound     │
//! │  duplicate product id on register()         →  Validation(Duplicate)   │
//! │  anything from the store                    →  CoreError::QueryFailed  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::good::GoodRepository;
use till_core::validation::{validate_new_good, validate_search_query, validate_threshold};
use till_core::{CoreError, CoreResult, Good, NewGood, ValidationError};

/// Catalog service over the goods table.
#[derive(Debug, Clone)]
pub struct Catalog {
    goods: GoodRepository,
}

impl Catalog {
    pub fn new(db: &Database) -> Self {
        Catalog { goods: db.goods() }
    }

    /// Every good, ordered by name.
    pub async fn list(&self) -> CoreResult<Vec<Good>> {
        self.goods
            .list()
            .await
            .map_err(DbError::into_query_error)
    }

    /// One good by id.
    pub async fn get(&self, good_id: &str) -> CoreResult<Good> {
        self.goods
            .get_by_id(good_id)
            .await
            .map_err(DbError::into_query_error)?
            .ok_or_else(|| CoreError::not_found("Good", good_id))
    }

    /// Lookup by scanned product id.
    pub async fn find_by_product_id(&self, product_id: &str) -> CoreResult<Good> {
        let code = product_id.trim();
        self.goods
            .get_by_product_id(code)
            .await
            .map_err(DbError::into_query_error)?
            .ok_or_else(|| CoreError::not_found("Good", code))
    }

    /// Case-insensitive substring match over name and product id.
    ///
    /// A blank query returns the whole catalog.
    pub async fn search(&self, query: &str) -> CoreResult<Vec<Good>> {
        let query = validate_search_query(query)?;
        let goods = self
            .goods
            .search(&query)
            .await
            .map_err(DbError::into_query_error)?;

        debug!(query = %query, count = goods.len(), "Catalog search");
        Ok(goods)
    }

    /// Goods with stock strictly below `threshold`, lowest first.
    pub async fn low_stock(&self, threshold: i64) -> CoreResult<Vec<Good>> {
        validate_threshold(threshold)?;
        self.goods
            .low_stock(threshold)
            .await
            .map_err(DbError::into_query_error)
    }

    /// Adds a new good with its opening stock.
    pub async fn register(&self, new: &NewGood) -> CoreResult<Good> {
        validate_new_good(new)?;

        let good = self.goods.insert(new).await.map_err(|e| match e {
            DbError::UniqueViolation { value, .. } => CoreError::Validation(
                ValidationError::Duplicate {
                    field: "product_id".to_string(),
                    value,
                },
            ),
            other => other.into_query_error(),
        })?;

        info!(good_id = %good.id, product_id = %good.product_id, stock = good.stock, "Good registered");
        Ok(good)
    }
}
