//! # Cart
//!
//! The in-progress sale: an ordered list of lines, one per good.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operation                 Effect                                       │
//! │  ─────────                 ──────                                       │
//! │  add(good, n)        ────► merge into existing line, or append          │
//! │  set_quantity(i, 0)  ────► lines.remove(i)                              │
//! │  set_quantity(i, n)  ────► lines[i].quantity = n                        │
//! │  remove(i)           ────► lines.remove(i)                              │
//! │  total()             ────► Σ price × quantity (recomputed every call)   │
//! │  clear()             ────► lines.clear()  (after a successful commit)   │
//! │                                                                         │
//! │  A rejected operation leaves the cart exactly as it was.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart belongs to one session and is never shared between commits, so
//! it is a plain owned value with `&mut self` methods.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Good, SaleLine};
use crate::validation::validate_price_cents;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// A line in the cart.
///
/// Name, price and cost are frozen when the good is first added. If the
/// catalog price changes afterwards, this line keeps the original price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub good_id: String,
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub cost_price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    fn from_good(good: &Good, quantity: i64) -> Self {
        CartLine {
            good_id: good.id.clone(),
            product_id: good.product_id.clone(),
            name: good.name.clone(),
            unit_price_cents: good.price_cents,
            cost_price_cents: good.cost_cents,
            quantity,
        }
    }

    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }

    /// Frozen copy recorded on the sale.
    pub fn to_sale_line(&self) -> SaleLine {
        SaleLine {
            good_id: self.good_id.clone(),
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            unit_price_cents: self.unit_price_cents,
            cost_price_cents: self.cost_price_cents,
            quantity: self.quantity,
        }
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `good_id` (adding the same good increases quantity)
/// - Every line has quantity in `1..=MAX_ITEM_QUANTITY`
/// - Every line has a unit price in `0..=MAX_PRICE_CENTS`
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `quantity` units of `good`.
    ///
    /// ## Behavior
    /// - Good already in cart: its line quantity increases
    /// - Otherwise: a new line is appended with a price/cost snapshot
    ///
    /// ## Errors
    /// - `InvalidQuantity` if `quantity < 1`
    /// - `Validation` if the good's price is outside `0..=MAX_PRICE_CENTS`
    /// - `QuantityTooLarge` if the line would exceed `MAX_ITEM_QUANTITY`
    /// - `CartTooLarge` if a new line would exceed `MAX_CART_ITEMS`
    pub fn add(&mut self, good: &Good, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return Err(CoreError::InvalidQuantity { quantity });
        }
        validate_price_cents("price", good.price_cents)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.good_id == good.id) {
            let merged = line.quantity + quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = merged;
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine::from_good(good, quantity));
        Ok(())
    }

    /// Overwrites the quantity of the line at `index`. Zero removes it.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        if quantity < 0 {
            return Err(CoreError::InvalidQuantity { quantity });
        }
        if index >= self.lines.len() {
            return Err(CoreError::CartLineNotFound { index });
        }
        if quantity == 0 {
            self.lines.remove(index);
            return Ok(());
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        self.lines[index].quantity = quantity;
        Ok(())
    }

    /// Drops the line at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::CartLineNotFound { index });
        }
        Ok(self.lines.remove(index))
    }

    /// Sum of price × quantity over all lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GoodType;
    use crate::MAX_PRICE_CENTS;
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

    #[test]
    fn test_add_appends_and_merges() {
        let x = good("x", 1000, 5);
        let y = good("y", 2000, 3);
        let mut cart = Cart::new();

        cart.add(&x, 2).unwrap();
        cart.add(&y, 1).unwrap();
        cart.add(&x, 1).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0].good_id, "x");
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.lines()[1].good_id, "y");
        assert_eq!(cart.total().cents(), 5000);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        let err = cart.add(&good("x", 1000, 5), 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { quantity: 0 }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_is_frozen_at_add_time() {
        let mut x = good("x", 1000, 5);
        let mut cart = Cart::new();
        cart.add(&x, 1).unwrap();

        x.price_cents = 9999;
        cart.add(&x, 1).unwrap();

        assert_eq!(cart.lines()[0].unit_price_cents, 1000);
        assert_eq!(cart.total().cents(), 2000);
    }

    #[test]
    fn test_set_quantity_zero_removes_line_and_reduces_total() {
        let mut cart = Cart::new();
        cart.add(&good("x", 1000, 5), 2).unwrap();
        cart.add(&good("y", 2000, 3), 1).unwrap();
        let before = cart.total();
        let contribution = cart.lines()[0].line_total();

        cart.set_quantity(0, 0).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].good_id, "y");
        assert_eq!(cart.total(), before - contribution);
    }

    #[test]
    fn test_set_quantity_overwrites_and_validates() {
        let mut cart = Cart::new();
        cart.add(&good("x", 1000, 5), 2).unwrap();

        cart.set_quantity(0, 4).unwrap();
        assert_eq!(cart.lines()[0].quantity, 4);

        assert!(matches!(
            cart.set_quantity(0, -1),
            Err(CoreError::InvalidQuantity { quantity: -1 })
        ));
        assert!(matches!(
            cart.set_quantity(3, 1),
            Err(CoreError::CartLineNotFound { index: 3 })
        ));
        assert!(matches!(
            cart.set_quantity(0, MAX_ITEM_QUANTITY + 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert_eq!(cart.lines()[0].quantity, 4);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(&good("x", 1000, 5), 2).unwrap();
        let removed = cart.remove(0).unwrap();
        assert_eq!(removed.good_id, "x");
        assert!(cart.is_empty());
        assert!(cart.remove(0).is_err());
    }

    #[test]
    fn test_merge_cannot_exceed_max_quantity() {
        let x = good("x", 100, 5000);
        let mut cart = Cart::new();
        cart.add(&x, MAX_ITEM_QUANTITY).unwrap();
        assert!(matches!(
            cart.add(&x, 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert_eq!(cart.lines()[0].quantity, MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add(&good(&i.to_string(), 100, 10), 1).unwrap();
        }
        let err = cart.add(&good("overflow", 100, 10), 1).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
        assert_eq!(cart.len(), MAX_CART_ITEMS);
    }

    #[test]
    fn test_largest_cart_total_fits() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add(&good(&i.to_string(), MAX_PRICE_CENTS, 5000), MAX_ITEM_QUANTITY)
                .unwrap();
        }
        let expected = MAX_PRICE_CENTS * MAX_ITEM_QUANTITY * MAX_CART_ITEMS as i64;
        assert_eq!(cart.total().cents(), expected);
    }

    #[test]
    fn test_add_rejects_out_of_range_price() {
        let mut cart = Cart::new();
        let err = cart.add(&good("x", i64::MAX / 2, 5), 3).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_total_recomputed_after_every_mutation() {
        let mut cart = Cart::new();
        cart.add(&good("x", 1000, 5), 2).unwrap();
        cart.add(&good("y", 2000, 3), 1).unwrap();
        assert_eq!(cart.total().cents(), 4000);
        cart.remove(1).unwrap();
        assert_eq!(cart.total().cents(), 2000);
        cart.clear();
        assert_eq!(cart.total(), Money::zero());
        assert_eq!(cart.total_quantity(), 0);
    }
}
