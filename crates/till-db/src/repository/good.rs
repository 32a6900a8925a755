//! # Good Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Listing, lookup by id and by scanned product id
//! - Substring search over name and product id
//! - Low-stock report
//! - Provisioning new goods
//! - Compare-and-swap stock update (inside the committer's transaction only)
//!
//! ## Who Writes Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert()            sets the initial stock of a NEW good              │
//! │  cas_stock()         the only update path; called by the committer     │
//! │                      with its open transaction                         │
//! │                                                                         │
//! │  UPDATE goods SET stock = :new                                         │
//! │   WHERE id = :id AND stock = :expected                                 │
//! │                                                                         │
//! │  rows_affected == 0  →  someone else moved the stock  →  Conflict      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::{Good, NewGood, StockAdjustment};

const GOOD_COLUMNS: &str = r#"
    id, product_id, name, price_cents, cost_cents,
    stock, quantity, good_type, created_at, updated_at
"#;

/// Repository for good database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = GoodRepository::new(pool);
///
/// let rice = repo.get_by_product_id("RICE-5KG").await?;
/// let matches = repo.search("milk").await?;
/// ```
#[derive(Debug, Clone)]
pub struct GoodRepository {
    pool: SqlitePool,
}

impl GoodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        GoodRepository { pool }
    }

    /// Lists every good, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Good>> {
        let goods = sqlx::query_as::<_, Good>(&format!(
            "SELECT {GOOD_COLUMNS} FROM goods ORDER BY name, product_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = goods.len(), "Listed goods");
        Ok(goods)
    }

    /// Gets a good by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Good))` - Good found
    /// * `Ok(None)` - Good not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Good>> {
        let good = sqlx::query_as::<_, Good>(&format!(
            "SELECT {GOOD_COLUMNS} FROM goods WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(good)
    }

    /// Gets a good by its scan code.
    pub async fn get_by_product_id(&self, product_id: &str) -> DbResult<Option<Good>> {
        debug!(product_id = %product_id, "Looking up good by product id");

        let good = sqlx::query_as::<_, Good>(&format!(
            "SELECT {GOOD_COLUMNS} FROM goods WHERE product_id = ?1"
        ))
        .bind(product_id.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(good)
    }

    /// Case-insensitive substring search over name and product id.
    ///
    /// An empty query lists everything.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Good>> {
        let query = query.trim();
        debug!(query = %query, "Searching goods");

        if query.is_empty() {
            return self.list().await;
        }

        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));

        let goods = sqlx::query_as::<_, Good>(&format!(
            r#"
            SELECT {GOOD_COLUMNS} FROM goods
            WHERE lower(name) LIKE ?1 ESCAPE '\'
               OR lower(product_id) LIKE ?1 ESCAPE '\'
            ORDER BY name, product_id
            "#
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = goods.len(), "Search returned goods");
        Ok(goods)
    }

    /// Number of goods in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM goods")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Goods with stock strictly below `threshold`, lowest stock first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Good>> {
        let goods = sqlx::query_as::<_, Good>(&format!(
            "SELECT {GOOD_COLUMNS} FROM goods WHERE stock < ?1 ORDER BY stock ASC, name"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(goods)
    }

    /// Inserts a new good with a fresh id.
    ///
    /// ## Returns
    /// * `Ok(Good)` - The stored good
    /// * `Err(DbError::UniqueViolation)` - product id already exists
    pub async fn insert(&self, new: &NewGood) -> DbResult<Good> {
        debug!(product_id = %new.product_id, "Inserting good");

        let now = Utc::now();
        let good = Good {
            id: Uuid::new_v4().to_string(),
            product_id: new.product_id.trim().to_string(),
            name: new.name.trim().to_string(),
            price_cents: new.price_cents,
            cost_cents: new.cost_cents,
            stock: new.stock,
            quantity: new.quantity,
            good_type: new.good_type,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO goods (
                id, product_id, name, price_cents, cost_cents,
                stock, quantity, good_type, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&good.id)
        .bind(&good.product_id)
        .bind(&good.name)
        .bind(good.price_cents)
        .bind(good.cost_cents)
        .bind(good.stock)
        .bind(good.quantity)
        .bind(good.good_type)
        .bind(good.created_at)
        .bind(good.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: good.product_id.clone(),
            },
            other => other,
        })?;

        Ok(good)
    }

    /// Current stock of one good, read on the given connection.
    pub(crate) async fn read_stock(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<i64>> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM goods WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(stock)
    }

    /// Applies one compare-and-swap stock update on the given connection.
    ///
    /// ## Returns
    /// * `Ok(())` - stock moved from `expected_stock` to `new_stock`
    /// * `Err(DbError::Conflict)` - stock no longer equals `expected_stock`
    /// * `Err(DbError::NotFound)` - the good was removed
    pub(crate) async fn cas_stock(
        conn: &mut SqliteConnection,
        adjustment: &StockAdjustment,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE goods
            SET stock = ?1, updated_at = ?2
            WHERE id = ?3 AND stock = ?4
            "#,
        )
        .bind(adjustment.new_stock)
        .bind(Utc::now())
        .bind(&adjustment.good_id)
        .bind(adjustment.expected_stock)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match Self::read_stock(conn, &adjustment.good_id).await? {
            Some(actual) => {
                debug!(
                    good_id = %adjustment.good_id,
                    expected = adjustment.expected_stock,
                    actual,
                    "Stock compare-and-swap missed"
                );
                Err(DbError::conflict("Good", &adjustment.good_id))
            }
            None => Err(DbError::not_found("Good", &adjustment.good_id)),
        }
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
