#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use ecom_suite::auth::{hash_password, issue_token};
use ecom_suite::domain::aggregates::{Coupon, GoogleProfile, Role, User};
use ecom_suite::domain::value_objects::{CouponCode, Email};
use ecom_suite::identity::IdentityVerifier;
use ecom_suite::payments::{GatewayOrderRequest, PaymentGateway};
use ecom_suite::store::{CouponRepository, MemoryStore, UserRepository};
use ecom_suite::{app, AppError, AppState, Config};

pub const JWT_SECRET: &str = "test_jwt_secret";
pub const RAZORPAY_SECRET: &str = "test_razorpay_secret";

/// Echoes the request back the way the gateway would, without network access.
struct StubGateway;

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_order(&self, request: &GatewayOrderRequest) -> ecom_suite::Result<Value> {
        Ok(json!({
            "id": "order_test_1",
            "amount": request.minor_units()?,
            "currency": request.currency,
            "receipt": request.receipt,
            "status": "created",
        }))
    }
}

/// Accepts `valid:<subject>:<email>` tokens.
struct StubVerifier;

#[async_trait]
impl IdentityVerifier for StubVerifier {
    async fn verify(&self, id_token: &str) -> ecom_suite::Result<GoogleProfile> {
        let mut parts = id_token.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("valid"), Some(subject), Some(email)) => Ok(GoogleProfile {
                subject: subject.to_string(),
                email: Email::new(email)?,
                name: Some("Google User".into()),
                picture: None,
            }),
            _ => Err(AppError::Unauthorized("Google authentication failed".into())),
        }
    }
}

pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), Arc::new(StubGateway), Arc::new(StubVerifier), Config::for_tests(JWT_SECRET, RAZORPAY_SECRET));
        Self { router: app(state), store }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {tok}"));
        }
        let request = match body {
            Some(json) => builder.header("content-type", "application/json").body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.expect("router error during test request");
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), token).await
    }

    /// Inserts a user directly and returns it with a bearer token.
    pub async fn user(&self, email: &str, role: Role) -> (User, String) {
        let mut user = User::with_password(Email::new(email).unwrap(), hash_password("secret1").unwrap(), Some(email.into()), Utc::now());
        user.role = role;
        self.store.insert_user(&user).await.unwrap();
        let token = issue_token(JWT_SECRET, user.id, 7, Utc::now()).unwrap();
        (user, token)
    }

    pub async fn coupon(&self, code: &str, percent: u8, expires_in: Duration, usage_limit: Option<u32>, used_count: u32) {
        let mut coupon = Coupon::new(CouponCode::new(code).unwrap(), percent, Utc::now() + expires_in, usage_limit).unwrap();
        coupon.used_count = used_count;
        self.store.insert_coupon(&coupon).await.unwrap();
    }

    /// Creates a product through the API as `seller_token` and returns its id.
    pub async fn product(&self, seller_token: &str, title: &str, category: &str, price: f64, stock: i32) -> Uuid {
        let (status, body) = self
            .post("/api/products", json!({"title": title, "description": "Test product", "price": price, "category": category, "stock": stock}), Some(seller_token))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().parse().unwrap()
    }
}

pub fn item(product_id: &str, seller_id: Uuid, price: f64, quantity: u32) -> Value {
    json!({
        "productId": product_id,
        "sellerId": seller_id,
        "title": format!("Item {product_id}"),
        "priceAtPurchase": price,
        "quantity": quantity,
    })
}
