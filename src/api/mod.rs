//! HTTP surface: routes under `/api` plus a health check.

mod accounts;
mod auth;
mod checkout;
mod orders;
mod products;
mod reviews;

use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub msg: String,
}

impl Message {
    pub fn new(msg: impl Into<String>) -> Json<Self> { Json(Self { msg: msg.into() }) }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "ecom-suite"})) }))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/google", post(auth::google))
        .route("/api/auth/role", put(auth::set_role))
        .route("/api/auth/me", get(auth::me))
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/seller", get(products::seller_products))
        .route("/api/products/:id", get(products::get).put(products::update).delete(products::remove))
        .route("/api/reviews", post(reviews::create))
        .route("/api/reviews/product/:id", get(reviews::for_product))
        .route("/api/reviews/:id", delete(reviews::remove))
        .route("/api/wishlist", get(accounts::wishlist))
        .route("/api/wishlist/:id", post(accounts::toggle_wishlist))
        .route("/api/addresses", get(accounts::addresses).post(accounts::add_address))
        .route("/api/addresses/:id", delete(accounts::remove_address))
        .route("/api/coupons/validate", post(checkout::validate_coupon))
        .route("/api/payment/create-order", post(checkout::create_payment_order))
        .route("/api/payment/verify", post(checkout::verify_payment))
        .route("/api/checkout/quote", post(checkout::quote))
        .route("/api/orders", post(orders::create))
        .route("/api/orders/my-orders", get(orders::my_orders))
        .route("/api/orders/seller", get(orders::seller_orders))
        .route("/api/orders/analytics", get(orders::analytics))
        .route("/api/orders/:id", get(orders::get))
        .route("/api/orders/:id/item/:product_id/status", patch(orders::update_item_status))
}
