use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::coupons;
use crate::domain::aggregates::{Checkout, CheckoutLine, Quote};
use crate::error::{AppError, Result};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLine {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Prices `lines` at live product prices and applies the coupon, if any.
/// Nothing is consumed.
pub async fn quote(store: &dyn Store, lines: &[QuoteLine], coupon_code: Option<&str>, now: DateTime<Utc>) -> Result<Quote> {
    if lines.is_empty() {
        return Err(AppError::validation("Cart is empty"));
    }
    let mut checkout = Checkout::new();
    for line in lines {
        let product = store
            .product_by_id(line.product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", line.product_id)))?;
        checkout.add_line(CheckoutLine {
            product_id: product.id.to_string(),
            title: product.title,
            quantity: line.quantity,
            unit_price: product.price,
        })?;
    }
    if let Some(code) = coupon_code.filter(|c| !c.trim().is_empty()) {
        checkout.apply_coupon(coupons::validate(store, code, now).await?);
    }
    Ok(checkout.quote())
}
