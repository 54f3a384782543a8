//! Payment-gateway seam and signature reconciliation.
//!
//! The storefront charges through Razorpay: the client opens a gateway order,
//! pays, and comes back with a signed callback. An order row is only written
//! once that callback's signature checks out.

pub mod razorpay;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{AppError, Result};

pub use razorpay::{RazorpayClient, UnconfiguredGateway};

type HmacSha256 = Hmac<Sha256>;

/// Signed callback returned by the gateway's checkout widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Request to open a gateway order. `amount` is in major units.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GatewayOrderRequest {
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
}

fn default_currency() -> String { "INR".to_string() }

impl GatewayOrderRequest {
    /// Amount in the currency's minor unit, half-way cases rounded up.
    pub fn minor_units(&self) -> Result<i64> {
        if self.amount <= Decimal::ZERO {
            return Err(AppError::validation("Amount must be greater than zero"));
        }
        (self.amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| AppError::validation("Amount is out of range"))
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens an order with the gateway and returns its JSON representation.
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<serde_json::Value>;
}

/// Hex-encoded HMAC-SHA256 over `order_id|payment_id`.
pub fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("hmac key: {e}")))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Succeeds only when the supplied signature matches the expected one exactly.
pub fn verify_payment(secret: &str, proof: &PaymentProof) -> Result<()> {
    let expected = expected_signature(secret, &proof.razorpay_order_id, &proof.razorpay_payment_id)?;
    if constant_time_eq(expected.as_bytes(), proof.razorpay_signature.as_bytes()) {
        Ok(())
    } else {
        tracing::warn!(order_id = %proof.razorpay_order_id, payment_id = %proof.razorpay_payment_id, "payment signature mismatch");
        Err(AppError::PaymentVerification)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() { return false; }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
