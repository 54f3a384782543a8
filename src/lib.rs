//! ecom-suite - Storefront API
//!
//! Backend for a multi-seller storefront.
//!
//! ## Features
//! - Order lifecycle with per-item statuses rolled up into an order status
//! - Seller analytics: daily revenue, category breakdown, low stock, summary
//! - Coupon validation and redemption
//! - Razorpay order creation and payment signature verification
//! - Catalog, reviews with sentiment, wishlist and saved addresses

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod payments;
pub mod services;
pub mod store;

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use error::{AppError, Result};

use identity::IdentityVerifier;
use payments::PaymentGateway;
use store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, gateway: Arc<dyn PaymentGateway>, identity: Arc<dyn IdentityVerifier>, config: Config) -> Self {
        Self { store, gateway, identity, config: Arc::new(config) }
    }
}

/// The full application router with tracing and CORS layers.
pub fn app(state: AppState) -> Router {
    api::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
