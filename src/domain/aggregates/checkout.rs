//! Checkout Aggregate
//!
//! Server-side pricing of a cart against live product prices, with an optional
//! coupon applied on top.

use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::aggregates::coupon::AppliedCoupon;
use crate::domain::value_objects::MAX_QUANTITY;

#[derive(Clone, Debug, Default)]
pub struct Checkout {
    lines: Vec<CheckoutLine>,
    coupon: Option<AppliedCoupon>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CheckoutLine {
    pub product_id: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl CheckoutLine {
    pub fn line_total(&self) -> Decimal { self.unit_price * Decimal::from(self.quantity) }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub subtotal: Decimal,
    pub discount_percentage: u8,
    pub discount: Decimal,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

impl Checkout {
    pub fn new() -> Self { Self::default() }

    /// Adds a line, merging it into an existing line for the same product.
    /// The merged quantity stays within `MAX_QUANTITY`.
    pub fn add_line(&mut self, line: CheckoutLine) -> Result<(), CheckoutError> {
        if !(1..=MAX_QUANTITY).contains(&line.quantity) { return Err(CheckoutError::InvalidQuantity); }
        if let Some(existing) = self.lines.iter_mut().find(|l| l.product_id == line.product_id) {
            existing.quantity = existing
                .quantity
                .checked_add(line.quantity)
                .filter(|q| *q <= MAX_QUANTITY)
                .ok_or(CheckoutError::InvalidQuantity)?;
        } else {
            self.lines.push(line);
        }
        Ok(())
    }

    pub fn apply_coupon(&mut self, coupon: AppliedCoupon) { self.coupon = Some(coupon); }

    pub fn subtotal(&self) -> Decimal { self.lines.iter().map(CheckoutLine::line_total).sum() }

    pub fn quote(&self) -> Quote {
        let subtotal = self.subtotal();
        let (discount_percentage, discount) = match &self.coupon {
            Some(c) => (c.discount_percentage, c.discount_on(subtotal)),
            None => (0, Decimal::ZERO),
        };
        Quote {
            subtotal, discount_percentage, discount, total: subtotal - discount,
            coupon_code: self.coupon.as_ref().map(|c| c.code.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error("Quantity must be between 1 and 10000")]
    InvalidQuantity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::CouponCode;

    fn line(id: &str, price: i64, quantity: u32) -> CheckoutLine {
        CheckoutLine { product_id: id.into(), title: id.into(), quantity, unit_price: Decimal::new(price, 2) }
    }

    #[test]
    fn test_lines_merge() {
        let mut checkout = Checkout::new();
        checkout.add_line(line("P1", 1000, 2)).unwrap();
        checkout.add_line(line("P1", 1000, 1)).unwrap();
        assert_eq!(checkout.subtotal(), Decimal::new(3000, 2));
        assert_eq!(checkout.add_line(line("P2", 100, 0)), Err(CheckoutError::InvalidQuantity));
    }

    #[test]
    fn test_merged_quantity_is_capped() {
        let mut checkout = Checkout::new();
        assert_eq!(checkout.add_line(line("P1", 100, u32::MAX)), Err(CheckoutError::InvalidQuantity));
        checkout.add_line(line("P1", 100, MAX_QUANTITY)).unwrap();
        assert_eq!(checkout.add_line(line("P1", 100, 1)), Err(CheckoutError::InvalidQuantity));
        assert_eq!(checkout.subtotal(), Decimal::new(100, 2) * Decimal::from(MAX_QUANTITY));
    }

    #[test]
    fn test_welcome10_on_200() {
        let mut checkout = Checkout::new();
        checkout.add_line(line("P1", 15000, 1)).unwrap();
        checkout.add_line(line("P2", 2500, 2)).unwrap();
        checkout.apply_coupon(AppliedCoupon { code: CouponCode::new("WELCOME10").unwrap(), discount_percentage: 10 });
        let quote = checkout.quote();
        assert_eq!(quote.subtotal, Decimal::new(20000, 2));
        assert_eq!(quote.discount, Decimal::new(2000, 2));
        assert_eq!(quote.total, Decimal::new(18000, 2));
        assert_eq!(quote.coupon_code.as_deref(), Some("WELCOME10"));
    }

    #[test]
    fn test_no_coupon() {
        let mut checkout = Checkout::new();
        checkout.add_line(line("P1", 999, 1)).unwrap();
        let quote = checkout.quote();
        assert_eq!(quote.total, quote.subtotal);
        assert_eq!(quote.discount_percentage, 0);
    }
}
