//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest amount a `NUMERIC(12, 2)` column holds: 9,999,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Units of one product allowed on a single line.
pub const MAX_QUANTITY: u32 = 10_000;

/// Coupon code value object. Codes are matched case-insensitively, so they are
/// normalised to upper case on the way in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    pub fn new(value: impl Into<String>) -> Result<Self, CouponCodeError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(CouponCodeError::Empty); }
        if value.len() > 32 { return Err(CouponCodeError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponCodeError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self { code.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponCodeError {
    #[error("Coupon code is required")]
    Empty,
    #[error("Coupon code is too long")]
    TooLong,
}

/// Email address, trimmed and lower-cased so uniqueness checks are stable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, EmailError> {
        let value = value.into().trim().to_lowercase();
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(Self(value)),
            _ => Err(EmailError::Invalid),
        }
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Email {
    type Error = EmailError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Email> for String {
    fn from(email: Email) -> Self { email.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("Invalid email address")]
    Invalid,
}

/// Star rating, 1 to 5 inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn new(value: i32) -> Result<Self, RatingError> {
        if !(Self::MIN..=Self::MAX).contains(&value) { return Err(RatingError::OutOfRange(value)); }
        Ok(Self(value as u8))
    }
    pub fn value(&self) -> u8 { self.0 }
}

impl TryFrom<i32> for Rating {
    type Error = RatingError;
    fn try_from(value: i32) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self { rating.0 as i32 }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("Rating must be between 1 and 5, got {0}")]
    OutOfRange(i32),
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_coupon_code() { let code = CouponCode::new(" welcome10 ").unwrap(); assert_eq!(code.as_str(), "WELCOME10"); }
    #[test]
    fn test_coupon_code_empty() { assert_eq!(CouponCode::new("   "), Err(CouponCodeError::Empty)); }
    #[test]
    fn test_email() {
        assert_eq!(Email::new(" Ada@Example.COM ").unwrap().as_str(), "ada@example.com");
        assert!(Email::new("not-an-email").is_err());
    }
    #[test]
    fn test_max_amount_fits_numeric_12_2() {
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
    }
    #[test]
    fn test_rating_bounds() {
        assert_eq!(Rating::new(5).unwrap().value(), 5);
        assert_eq!(Rating::new(0), Err(RatingError::OutOfRange(0)));
        assert!(serde_json::from_str::<Rating>("6").is_err());
    }
}
