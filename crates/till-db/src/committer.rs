//! # Transaction Committer
//!
//! Finalizes a cart into a recorded sale while decrementing stock for every
//! line, all-or-nothing.
//!
//! ## Commit Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit(&mut cart, salesperson, paid)                                   │
//! │     │                                                                   │
//! │     ├── validate_commit_input      (no store access yet)               │
//! │     │                                                                   │
//! │     │   ┌──────────── attempt 1..=max_conflict_retries ─────────────┐  │
//! │     ├──►│ read current stock of every good     (timeout-bounded)    │  │
//! │     │   │ plan_commit → InsufficientStock / NotFound                │  │
//! │     │   │ atomic_batch(plan.ops())             (timeout-bounded)    │  │
//! │     │   │   Ok        → clear cart, return sale + change            │  │
//! │     │   │   Conflict  → another till moved stock; re-read, re-plan  │  │
//! │     │   │   other err → CommitFailed, cart untouched                │  │
//! │     │   └───────────────────────────────────────────────────────────┘  │
//! │     │                                                                   │
//! │     └── retries exhausted → CommitFailed                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A conflicting batch has no durable effect, so re-planning it is safe.
//! No other failure is retried.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{DbError, DbResult};
use crate::store::StockStore;
use till_core::{
    plan_commit, validate_commit_input, Cart, CoreError, CoreResult, Receipt, Sale, StoreInfo,
};

// =============================================================================
// Configuration
// =============================================================================

/// Tuning for the committer.
#[derive(Debug, Clone)]
pub struct CommitterConfig {
    /// Attempts made when a compare-and-swap conflict is detected.
    /// Default: 3
    pub max_conflict_retries: u32,

    /// Upper bound on any single store call.
    ///
    /// A batch may first wait up to `DbConfig::busy_timeout` for the write
    /// lock, so this must be longer than that wait.
    /// Default: 5 seconds
    pub store_timeout: Duration,

    /// Accept payments below the total (change is floored at zero).
    /// Default: true
    pub allow_underpayment: bool,
}

impl Default for CommitterConfig {
    fn default() -> Self {
        CommitterConfig {
            max_conflict_retries: 3,
            store_timeout: Duration::from_secs(5),
            allow_underpayment: true,
        }
    }
}

impl CommitterConfig {
    pub fn max_conflict_retries(mut self, attempts: u32) -> Self {
        self.max_conflict_retries = attempts;
        self
    }

    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Raises `store_timeout` to at least twice `busy_timeout`.
    ///
    /// ## Example
    /// ```rust
    /// use std::time::Duration;
    /// use till_db::CommitterConfig;
    ///
    /// let config = CommitterConfig::default()
    ///     .store_timeout(Duration::from_secs(1))
    ///     .covering_busy_timeout(Duration::from_secs(2));
    /// assert_eq!(config.store_timeout, Duration::from_secs(4));
    /// ```
    pub fn covering_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.store_timeout = self.store_timeout.max(busy_timeout * 2);
        self
    }

    pub fn allow_underpayment(mut self, allow: bool) -> Self {
        self.allow_underpayment = allow;
        self
    }
}

// =============================================================================
// Result
// =============================================================================

/// A committed sale plus the change owed to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub sale: Sale,
    pub change_cents: i64,
}

impl CommitReceipt {
    /// Printable payload for this sale.
    pub fn receipt(&self, store: &StoreInfo) -> Receipt {
        Receipt::from_sale(&self.sale, store)
    }
}

// =============================================================================
// Committer
// =============================================================================

/// Commits carts against a [`StockStore`].
///
/// ## Example
/// ```rust,ignore
/// let committer = TransactionCommitter::new(db.clone(), CommitterConfig::default());
/// let done = committer.commit(&mut cart, "amy", 5000).await?;
/// println!("change: {}", Money::from_cents(done.change_cents));
/// ```
#[derive(Debug, Clone)]
pub struct TransactionCommitter<S> {
    store: S,
    config: CommitterConfig,
}

impl<S: StockStore> TransactionCommitter<S> {
    pub fn new(store: S, config: CommitterConfig) -> Self {
        TransactionCommitter { store, config }
    }

    /// Commits `cart` as one sale.
    ///
    /// On success the cart is cleared. On any error the cart is left exactly
    /// as it was and no stock has moved.
    pub async fn commit(
        &self,
        cart: &mut Cart,
        salesperson_id: &str,
        amount_paid_cents: i64,
    ) -> CoreResult<CommitReceipt> {
        validate_commit_input(
            cart,
            salesperson_id,
            amount_paid_cents,
            self.config.allow_underpayment,
        )?;

        let attempts = self.config.max_conflict_retries.max(1);

        for attempt in 1..=attempts {
            let stock = self.read_stock(cart).await?;

            let plan = plan_commit(
                cart,
                salesperson_id,
                amount_paid_cents,
                self.config.allow_underpayment,
                |id| stock.get(id).copied(),
            )?;

            let shortfall = plan.shortfall();
            if !shortfall.is_zero() {
                warn!(
                    salesperson = %plan.draft.salesperson_id,
                    total = %plan.total(),
                    shortfall = %shortfall,
                    "Accepting underpayment"
                );
            }

            match self.bounded(self.store.atomic_batch(plan.ops())).await {
                Ok(sales) => {
                    let sale = sales.into_iter().next().ok_or_else(|| {
                        CoreError::CommitFailed("store returned no sale for the batch".to_string())
                    })?;
                    cart.clear();
                    info!(
                        sale_id = %sale.id,
                        receipt = %sale.receipt_number,
                        total = %sale.total(),
                        change = %sale.change(),
                        profit = %sale.profit(),
                        items = sale.item_count(),
                        attempt,
                        "Sale committed"
                    );
                    return Ok(CommitReceipt {
                        change_cents: sale.change_cents,
                        sale,
                    });
                }
                Err(err) if err.is_conflict() => {
                    warn!(attempt, attempts, error = %err, "Stock changed during commit, re-planning");
                }
                Err(err) => {
                    error!(error = %err, "Commit batch failed");
                    return Err(err.into_commit_error());
                }
            }
        }

        Err(CoreError::CommitFailed(format!(
            "stock kept changing concurrently; gave up after {attempts} attempts"
        )))
    }

    /// Re-reads the current stock of every good in the cart.
    async fn read_stock(&self, cart: &Cart) -> CoreResult<HashMap<String, i64>> {
        let mut stock = HashMap::with_capacity(cart.len());
        for line in cart.lines() {
            if stock.contains_key(&line.good_id) {
                continue;
            }
            let good = self
                .bounded(self.store.read_good(&line.good_id))
                .await
                .map_err(DbError::into_commit_error)?;
            if let Some(good) = good {
                stock.insert(good.id, good.stock);
            }
        }
        Ok(stock)
    }

    /// Applies the store timeout to one call.
    async fn bounded<T, F>(&self, call: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        tokio::time::timeout(self.config.store_timeout, call)
            .await
            .map_err(|_| {
                DbError::TransactionFailed(format!(
                    "store call timed out after {:?}",
                    self.config.store_timeout
                ))
            })?
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
