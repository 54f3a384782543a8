//! Razorpay orders API client.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{GatewayOrderRequest, PaymentGateway};
use crate::config::RazorpayConfig;
use crate::error::{AppError, Result};

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

#[derive(Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    orders_url: String,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<&'a str>,
}

impl RazorpayClient {
    pub fn new(config: &RazorpayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("http client: {e}")))?;
        Ok(Self { http, key_id: config.key_id.clone(), key_secret: config.key_secret.clone(), orders_url: ORDERS_URL.to_string() })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<serde_json::Value> {
        let body = CreateOrderBody { amount: request.minor_units()?, currency: &request.currency, receipt: request.receipt.as_deref() };
        let response = self.http
            .post(&self.orders_url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "razorpay order request failed");
                AppError::ExternalService("Failed to create Razorpay order".into())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, %detail, "razorpay rejected order");
            return Err(AppError::ExternalService("Failed to create Razorpay order".into()));
        }
        response.json().await.map_err(|e| AppError::ExternalService(format!("Unreadable gateway response: {e}")))
    }
}

/// Stand-in used when no gateway keys are configured.
pub struct UnconfiguredGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredGateway {
    async fn create_order(&self, _request: &GatewayOrderRequest) -> Result<serde_json::Value> {
        Err(AppError::ExternalService("Payment gateway is not configured".into()))
    }
}
