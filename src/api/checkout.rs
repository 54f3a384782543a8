use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{AppliedCoupon, Quote};
use crate::error::{AppError, Result};
use crate::payments::{self, GatewayOrderRequest, PaymentProof};
use crate::services::checkout::QuoteLine;
use crate::services::{checkout, coupons};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub items: Vec<QuoteLine>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Verified {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn validate_coupon(State(s): State<AppState>, Json(body): Json<ValidateCouponRequest>) -> Result<Json<AppliedCoupon>> {
    let code = body.code.unwrap_or_default();
    Ok(Json(coupons::validate(s.store.as_ref(), &code, Utc::now()).await?))
}

pub async fn quote(State(s): State<AppState>, Json(body): Json<QuoteRequest>) -> Result<Json<Quote>> {
    Ok(Json(checkout::quote(s.store.as_ref(), &body.items, body.coupon_code.as_deref(), Utc::now()).await?))
}

pub async fn create_payment_order(State(s): State<AppState>, Json(body): Json<GatewayOrderRequest>) -> Result<Json<serde_json::Value>> {
    Ok(Json(s.gateway.create_order(&body).await?))
}

pub async fn verify_payment(State(s): State<AppState>, Json(proof): Json<PaymentProof>) -> Result<Json<Verified>> {
    let secret = s.config.razorpay.as_ref()
        .map(|r| r.key_secret.as_str())
        .ok_or_else(|| AppError::ExternalService("Payment gateway is not configured".into()))?;
    payments::verify_payment(secret, &proof)?;
    Ok(Json(Verified { status: "success", message: "Payment verified successfully" }))
}
