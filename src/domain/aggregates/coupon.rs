//! Coupon Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::value_objects::CouponCode;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub code: CouponCode,
    pub discount_percentage: u8,
    pub expiration_date: DateTime<Utc>,
    pub is_active: bool,
    pub usage_limit: Option<u32>,
    pub used_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a successful validation, as returned to the storefront.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: CouponCode,
    pub discount_percentage: u8,
}

impl AppliedCoupon {
    /// Discount on `subtotal`, rounded to cents.
    pub fn discount_on(&self, subtotal: Decimal) -> Decimal {
        (subtotal * Decimal::from(self.discount_percentage) / Decimal::ONE_HUNDRED).round_dp(2)
    }
}

impl Coupon {
    pub fn new(code: CouponCode, discount_percentage: u8, expiration_date: DateTime<Utc>, usage_limit: Option<u32>) -> Result<Self, CouponError> {
        if !(1..=100).contains(&discount_percentage) { return Err(CouponError::InvalidDiscount(discount_percentage)); }
        Ok(Self {
            id: Uuid::now_v7(), code, discount_percentage, expiration_date, is_active: true,
            usage_limit, used_count: 0, created_at: Utc::now(),
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_limit.is_some_and(|limit| self.used_count >= limit)
    }

    /// Checks an active coupon against expiry and usage limit. Looking the code
    /// up (and treating inactive coupons as absent) is the caller's job.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<AppliedCoupon, CouponError> {
        if !self.is_active { return Err(CouponError::Inactive); }
        if self.expiration_date < now { return Err(CouponError::Expired); }
        if self.is_exhausted() { return Err(CouponError::UsageLimitReached); }
        Ok(AppliedCoupon { code: self.code.clone(), discount_percentage: self.discount_percentage })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponError {
    #[error("Invalid or inactive coupon code")]
    Inactive,
    #[error("Coupon has expired")]
    Expired,
    #[error("Coupon usage limit reached")]
    UsageLimitReached,
    #[error("Discount percentage must be between 1 and 100, got {0}")]
    InvalidDiscount(u8),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(limit: Option<u32>, used: u32, expires_in_days: i64) -> Coupon {
        let mut c = Coupon::new(CouponCode::new("welcome10").unwrap(), 10, Utc::now() + Duration::days(expires_in_days), limit).unwrap();
        c.used_count = used;
        c
    }

    #[test]
    fn test_valid_coupon() {
        let applied = coupon(None, 0, 30).validate(Utc::now()).unwrap();
        assert_eq!(applied.code.as_str(), "WELCOME10");
        assert_eq!(applied.discount_percentage, 10);
    }

    #[test]
    fn test_expired() {
        assert_eq!(coupon(None, 0, -1).validate(Utc::now()), Err(CouponError::Expired));
    }

    #[test]
    fn test_usage_limit() {
        assert_eq!(coupon(Some(3), 3, 30).validate(Utc::now()), Err(CouponError::UsageLimitReached));
        assert!(coupon(Some(3), 2, 30).validate(Utc::now()).is_ok());
    }

    #[test]
    fn test_inactive() {
        let mut c = coupon(None, 0, 30);
        c.is_active = false;
        assert_eq!(c.validate(Utc::now()), Err(CouponError::Inactive));
    }

    #[test]
    fn test_discount_rounding() {
        let applied = AppliedCoupon { code: CouponCode::new("X").unwrap(), discount_percentage: 15 };
        assert_eq!(applied.discount_on(Decimal::new(1999, 2)), Decimal::new(300, 2));
        assert_eq!(Coupon::new(CouponCode::new("X").unwrap(), 0, Utc::now(), None).unwrap_err(), CouponError::InvalidDiscount(0));
    }
}
