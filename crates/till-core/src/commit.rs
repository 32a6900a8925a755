//! # Commit Planning
//!
//! Turns a cart plus freshly read stock levels into the atomic batch a sale
//! is committed as. Nothing here touches the store; `till-db` reads the stock,
//! calls [`plan_commit`], and submits [`CommitPlan::ops`] in one transaction.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_commit_input(cart, salesperson, paid)                         │
//! │     ├── cart empty?            → EmptyCart                              │
//! │     ├── salesperson blank?     → MissingSalesperson                     │
//! │     └── paid < 0?              → InvalidPaymentAmount                   │
//! │           │                                                             │
//! │           ▼   (store re-read happens here, in till-db)                  │
//! │  plan_commit(..., stock_of)                                             │
//! │     ├── good gone?             → NotFound                               │
//! │     ├── stock − qty < 0?       → InsufficientStock                      │
//! │     └── OK → CommitPlan                                                 │
//! │                 ├── CreateSale(SaleDraft)                               │
//! │                 └── UpdateStock { good, expected, new } × lines         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `expected_stock` is the value the plan was computed from. The store applies
//! each update only if the row still holds that value; otherwise the batch is
//! abandoned and the caller re-reads and re-plans.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::SaleLine;
use crate::validation::validate_salesperson;

// =============================================================================
// Batch Types
// =============================================================================

/// Compare-and-swap stock update for one good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub good_id: String,
    pub expected_stock: i64,
    pub new_stock: i64,
}

impl StockAdjustment {
    pub fn decrement(&self) -> i64 {
        self.expected_stock - self.new_stock
    }
}

/// Everything needed to record a sale except what the ledger assigns
/// (id, receipt number, timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub salesperson_id: String,
    pub lines: Vec<SaleLine>,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub change_cents: i64,
}

/// One operation in an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOp {
    CreateSale(SaleDraft),
    UpdateStock(StockAdjustment),
}

/// A validated, stock-checked sale ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    pub draft: SaleDraft,
    pub adjustments: Vec<StockAdjustment>,
}

impl CommitPlan {
    /// Batch operations in submission order: the sale first, then one
    /// stock update per good in cart order.
    pub fn ops(&self) -> Vec<BatchOp> {
        let mut ops = Vec::with_capacity(self.adjustments.len() + 1);
        ops.push(BatchOp::CreateSale(self.draft.clone()));
        ops.extend(self.adjustments.iter().cloned().map(BatchOp::UpdateStock));
        ops
    }

    pub fn total(&self) -> Money {
        Money::from_cents(self.draft.total_cents)
    }

    pub fn change(&self) -> Money {
        Money::from_cents(self.draft.change_cents)
    }

    /// How much the payment falls short of the total; zero when fully paid.
    pub fn shortfall(&self) -> Money {
        self.total()
            .saturating_sub_floor(Money::from_cents(self.draft.amount_paid_cents))
    }
}

// =============================================================================
// Planning
// =============================================================================

/// Checks that can be made without the store. Returns the trimmed
/// salesperson identifier.
///
/// ## Order
/// `EmptyCart` → `MissingSalesperson` → `InvalidPaymentAmount`
pub fn validate_commit_input(
    cart: &Cart,
    salesperson_id: &str,
    amount_paid_cents: i64,
    allow_underpayment: bool,
) -> CoreResult<String> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let salesperson =
        validate_salesperson(salesperson_id).map_err(|_| CoreError::MissingSalesperson)?;

    if amount_paid_cents < 0 {
        return Err(CoreError::InvalidPaymentAmount {
            reason: "amount paid cannot be negative".to_string(),
        });
    }

    let total = cart.total();
    if !allow_underpayment && amount_paid_cents < total.cents() {
        return Err(CoreError::InvalidPaymentAmount {
            reason: format!(
                "amount paid {} is less than total {}",
                Money::from_cents(amount_paid_cents),
                total
            ),
        });
    }

    Ok(salesperson)
}

/// Builds the commit plan from the cart and the current stock of each good.
///
/// `stock_of` returns the stock just read from the store, or `None` if the
/// good no longer exists.
///
/// ## Example
/// ```rust
/// use std::collections::HashMap;
/// use till_core::{plan_commit, Cart};
/// # use till_core::{Good, GoodType};
/// # let now = chrono::Utc::now();
/// # let rice = Good { id: "g1".into(), product_id: "RICE".into(), name: "Rice".into(),
/// #     price_cents: 1000, cost_cents: 700, stock: 5, quantity: 0,
/// #     good_type: GoodType::Retail, created_at: now, updated_at: now };
///
/// let mut cart = Cart::new();
/// cart.add(&rice, 2).unwrap();
///
/// let stock: HashMap<String, i64> = [("g1".to_string(), 5)].into();
/// let plan = plan_commit(&cart, "amy", 2500, true, |id| stock.get(id).copied()).unwrap();
///
/// assert_eq!(plan.adjustments[0].new_stock, 3);
/// assert_eq!(plan.change().cents(), 500);
/// ```
pub fn plan_commit<F>(
    cart: &Cart,
    salesperson_id: &str,
    amount_paid_cents: i64,
    allow_underpayment: bool,
    stock_of: F,
) -> CoreResult<CommitPlan>
where
    F: Fn(&str) -> Option<i64>,
{
    let salesperson =
        validate_commit_input(cart, salesperson_id, amount_paid_cents, allow_underpayment)?;

    // Tracks stock already claimed by earlier lines of this plan.
    let mut remaining: HashMap<&str, i64> = HashMap::new();
    let mut adjustments: Vec<StockAdjustment> = Vec::with_capacity(cart.len());

    for line in cart.lines() {
        let available = match remaining.get(line.good_id.as_str()) {
            Some(left) => *left,
            None => stock_of(&line.good_id)
                .ok_or_else(|| CoreError::not_found("Good", line.good_id.clone()))?,
        };

        let new_stock = available - line.quantity;
        if new_stock < 0 {
            return Err(CoreError::InsufficientStock {
                good_id: line.good_id.clone(),
                available,
                requested: line.quantity,
            });
        }
        remaining.insert(line.good_id.as_str(), new_stock);

        match adjustments.iter_mut().find(|a| a.good_id == line.good_id) {
            Some(adj) => adj.new_stock = new_stock,
            None => adjustments.push(StockAdjustment {
                good_id: line.good_id.clone(),
                expected_stock: available,
                new_stock,
            }),
        }
    }

    let total = cart.total();
    let paid = Money::from_cents(amount_paid_cents);

    Ok(CommitPlan {
        draft: SaleDraft {
            salesperson_id: salesperson,
            lines: cart.lines().iter().map(|l| l.to_sale_line()).collect(),
            total_cents: total.cents(),
            amount_paid_cents,
            change_cents: paid.saturating_sub_floor(total).cents(),
        },
        adjustments,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Good, GoodType};
    use chrono::Utc;

    fn good(id: &str, price: i64, stock: i64) -> Good {
        Good {
            id: id.to_string(),
            product_id: format!("P-{id}"),
            name: format!("Good {id}"),
            price_cents: price,
            cost_cents: price / 2,
            stock,
            quantity: 0,
            good_type: GoodType::Retail,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn stocks(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_plan_two_goods_with_change() {
        let mut cart = Cart::new();
        cart.add(&good("x", 1000, 5), 2).unwrap();
        cart.add(&good("y", 2000, 3), 1).unwrap();
        let stock = stocks(&[("x", 5), ("y", 3)]);

        let plan = plan_commit(&cart, "amy", 5000, true, |id| stock.get(id).copied()).unwrap();

        assert_eq!(plan.draft.total_cents, 4000);
        assert_eq!(plan.draft.change_cents, 1000);
        assert_eq!(
            plan.adjustments,
            vec![
                StockAdjustment {
                    good_id: "x".into(),
                    expected_stock: 5,
                    new_stock: 3
                },
                StockAdjustment {
                    good_id: "y".into(),
                    expected_stock: 3,
                    new_stock: 2
                },
            ]
        );
        let ops = plan.ops();
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], BatchOp::CreateSale(_)));
    }

    #[test]
    fn test_plan_uses_fresh_stock_not_cart_snapshot() {
        let mut cart = Cart::new();
        cart.add(&good("x", 1000, 50), 10).unwrap();
        let stock = stocks(&[("x", 5)]);

        let err = plan_commit(&cart, "amy", 0, true, |id| stock.get(id).copied()).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                good_id,
                available,
                requested,
            } => {
                assert_eq!(good_id, "x");
                assert_eq!(available, 5);
                assert_eq!(requested, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_order() {
        let empty = Cart::new();
        assert!(matches!(
            plan_commit(&empty, "", -1, true, |_| Some(1)),
            Err(CoreError::EmptyCart)
        ));

        let mut cart = Cart::new();
        cart.add(&good("x", 1000, 5), 1).unwrap();
        assert!(matches!(
            plan_commit(&cart, "  ", -1, true, |_| Some(1)),
            Err(CoreError::MissingSalesperson)
        ));
        assert!(matches!(
            plan_commit(&cart, "amy", -1, true, |_| Some(1)),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn test_missing_good_is_not_found() {
        let mut cart = Cart::new();
        cart.add(&good("gone", 1000, 5), 1).unwrap();
        assert!(matches!(
            plan_commit(&cart, "amy", 1000, true, |_| None),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_underpayment_policy() {
        let mut cart = Cart::new();
        cart.add(&good("x", 1000, 5), 2).unwrap();

        let plan = plan_commit(&cart, "amy", 1500, true, |_| Some(5)).unwrap();
        assert_eq!(plan.draft.change_cents, 0);
        assert_eq!(plan.shortfall().cents(), 500);

        assert!(matches!(
            plan_commit(&cart, "amy", 1500, false, |_| Some(5)),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn test_salesperson_is_trimmed() {
        let mut cart = Cart::new();
        cart.add(&good("x", 1000, 5), 1).unwrap();
        let plan = plan_commit(&cart, " amy ", 1000, true, |_| Some(5)).unwrap();
        assert_eq!(plan.draft.salesperson_id, "amy");
    }
}
