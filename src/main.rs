//! ecom-suite server

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecom_suite::domain::aggregates::Coupon;
use ecom_suite::domain::value_objects::CouponCode;
use ecom_suite::identity::{GoogleVerifier, IdentityVerifier};
use ecom_suite::payments::{PaymentGateway, RazorpayClient, UnconfiguredGateway};
use ecom_suite::store::{CouponRepository, MemoryStore, PgStore, Store};
use ecom_suite::{app, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            let memory = MemoryStore::new();
            seed_welcome_coupon(&memory).await?;
            Arc::new(memory)
        }
    };

    let gateway: Arc<dyn PaymentGateway> = match &config.razorpay {
        Some(keys) => Arc::new(RazorpayClient::new(keys)?),
        None => {
            tracing::warn!("Razorpay keys not set, payments disabled");
            Arc::new(UnconfiguredGateway)
        }
    };
    let identity: Arc<dyn IdentityVerifier> = Arc::new(GoogleVerifier::new(config.google_client_id.clone())?);

    let port = config.port;
    let router = app(AppState::new(store, gateway, identity, config));

    tracing::info!("🚀 ecom-suite listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, router).await?;
    Ok(())
}

/// Same starter coupon the Postgres seed migration inserts.
async fn seed_welcome_coupon(store: &MemoryStore) -> Result<()> {
    let expires: DateTime<Utc> = "2026-12-31T00:00:00Z".parse()?;
    store.insert_coupon(&Coupon::new(CouponCode::new("WELCOME10")?, 10, expires, None)?).await?;
    Ok(())
}
