use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{AuthUser, MaybeAuthUser, SellerUser};
use crate::domain::aggregates::{Order, OrderItem, ShippingAddress, TrackingInfo};
use crate::domain::analytics::SellerAnalytics;
use crate::domain::status::OrderStatus;
use crate::domain::value_objects::CouponCode;
use crate::error::Result;
use crate::payments::PaymentProof;
use crate::services::orders::{self, ItemStatusUpdate, PlaceOrder};
use crate::services::analytics;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub payment: Option<PaymentProof>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatusRequest {
    pub status: String,
    #[serde(default)]
    pub tracking_info: Option<TrackingInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn create(State(s): State<AppState>, MaybeAuthUser(user): MaybeAuthUser, Json(body): Json<CreateOrderRequest>) -> Result<(StatusCode, Json<Order>)> {
    let coupon_code = match body.coupon_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => Some(CouponCode::new(code)?),
        _ => None,
    };
    let request = PlaceOrder {
        items: body.items,
        total_amount: body.total_amount,
        shipping_address: body.shipping_address,
        coupon_code,
        payment: body.payment,
    };
    let secret = s.config.razorpay.as_ref().map(|r| r.key_secret.as_str());
    let order = orders::place(s.store.as_ref(), secret, user.map(|u| u.id), request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn my_orders(State(s): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Vec<Order>>> {
    Ok(Json(orders::my_orders(s.store.as_ref(), user.id).await?))
}

pub async fn seller_orders(State(s): State<AppState>, SellerUser(seller): SellerUser) -> Result<Json<Vec<Order>>> {
    Ok(Json(orders::seller_orders(s.store.as_ref(), seller.id).await?))
}

pub async fn analytics(State(s): State<AppState>, SellerUser(seller): SellerUser) -> Result<Json<SellerAnalytics>> {
    Ok(Json(analytics::seller_analytics(s.store.as_ref(), seller.id, Utc::now()).await?))
}

pub async fn get(State(s): State<AppState>, AuthUser(user): AuthUser, Path(id): Path<Uuid>) -> Result<Json<Order>> {
    Ok(Json(orders::order_for_user(s.store.as_ref(), user.id, id).await?))
}

pub async fn update_item_status(
    State(s): State<AppState>,
    SellerUser(seller): SellerUser,
    Path((id, product_id)): Path<(Uuid, String)>,
    Json(body): Json<ItemStatusRequest>,
) -> Result<Json<Order>> {
    let status: OrderStatus = body.status.parse()?;
    let update = ItemStatusUpdate { status, tracking_info: body.tracking_info, message: body.message };
    let order = orders::update_item_status(s.store.as_ref(), seller.id, id, &product_id, update, Utc::now()).await?;
    Ok(Json(order))
}
