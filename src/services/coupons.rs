use chrono::{DateTime, Utc};

use crate::domain::aggregates::{AppliedCoupon, CouponError};
use crate::domain::value_objects::CouponCode;
use crate::error::{AppError, Result};
use crate::store::Store;

/// Looks up an active coupon by code, any casing, and checks expiry and usage.
/// Never consumes a use.
pub async fn validate(store: &dyn Store, raw_code: &str, now: DateTime<Utc>) -> Result<AppliedCoupon> {
    let code = CouponCode::new(raw_code)?;
    let coupon = store.active_coupon(&code).await?.ok_or(CouponError::Inactive)?;
    coupon.validate(now).map_err(|err| {
        tracing::info!(%code, reason = %err, "coupon rejected");
        AppError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Coupon;
    use crate::store::{CouponRepository, MemoryStore};
    use chrono::Duration;

    async fn seeded(limit: Option<u32>, expires_in: Duration) -> MemoryStore {
        let store = MemoryStore::new();
        let coupon = Coupon::new(CouponCode::new("WELCOME10").unwrap(), 10, Utc::now() + expires_in, limit).unwrap();
        store.insert_coupon(&coupon).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_validate_any_casing() {
        let store = seeded(None, Duration::days(3)).await;
        for code in ["welcome10", "WELCOME10", " Welcome10 "] {
            let applied = validate(&store, code, Utc::now()).await.unwrap();
            assert_eq!(applied.discount_percentage, 10);
        }
    }

    #[tokio::test]
    async fn test_expired_and_missing() {
        let store = seeded(None, Duration::days(-1)).await;
        assert!(matches!(validate(&store, "welcome10", Utc::now()).await, Err(AppError::CouponExpired)));
        assert!(matches!(validate(&store, "NOPE", Utc::now()).await, Err(AppError::NotFound(_))));
        assert!(matches!(validate(&store, "  ", Utc::now()).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_validation_does_not_consume() {
        let store = seeded(Some(1), Duration::days(3)).await;
        validate(&store, "WELCOME10", Utc::now()).await.unwrap();
        validate(&store, "WELCOME10", Utc::now()).await.unwrap();
        let code = CouponCode::new("WELCOME10").unwrap();
        assert_eq!(store.active_coupon(&code).await.unwrap().unwrap().used_count, 0);
    }
}
