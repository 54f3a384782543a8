//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::events::{CouponEvent, DomainEvent, OrderEvent};
use crate::domain::status::{aggregate_status, OrderStatus};
use crate::domain::value_objects::{CouponCode, MAX_AMOUNT, MAX_QUANTITY};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: Uuid,
    user_id: Option<Uuid>,
    items: Vec<OrderItem>,
    total_amount: Decimal,
    status: OrderStatus,
    shipping_address: ShippingAddress,
    tracking_info: Option<TrackingInfo>,
    status_history: Vec<StatusChange>,
    coupon_code: Option<CouponCode>,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// A purchased line. Product, seller, title and price are snapshots taken at
/// checkout so the order stays stable when the live product changes.
/// `Order::place` bounds price and quantity, so line totals cannot overflow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub seller_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price_at_purchase: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub status: OrderStatus,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal { self.price_at_purchase * Decimal::from(self.quantity) }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress { pub full_name: String, pub email: String, pub address: String, pub city: String, pub state: String, pub zip: String }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo { pub carrier: String, pub tracking_number: String }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Input for placing an order. Prices are trusted as given.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub user_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddress,
    pub coupon_code: Option<CouponCode>,
    pub payment_id: Option<String>,
}

/// Persisted form of an order, used by stores to rebuild the aggregate.
#[derive(Clone, Debug)]
pub struct OrderParts {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub tracking_info: Option<TrackingInfo>,
    pub status_history: Vec<StatusChange>,
    pub coupon_code: Option<CouponCode>,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn place(new: NewOrder, now: DateTime<Utc>) -> Result<Self, OrderError> {
        if new.items.is_empty() { return Err(OrderError::NoItems); }
        if let Some(item) = new.items.iter().find(|i| !(1..=MAX_QUANTITY).contains(&i.quantity)) {
            return Err(OrderError::InvalidQuantity(item.product_id.clone()));
        }
        if new.items.iter().any(|i| i.price_at_purchase.is_sign_negative()) || new.total_amount.is_sign_negative() {
            return Err(OrderError::NegativeAmount);
        }
        if new.items.iter().any(|i| i.price_at_purchase > MAX_AMOUNT) || new.total_amount > MAX_AMOUNT {
            return Err(OrderError::AmountTooLarge);
        }
        let items = new.items.into_iter().map(|i| OrderItem { status: OrderStatus::Pending, ..i }).collect();
        let id = Uuid::now_v7();
        let mut order = Self {
            id, user_id: new.user_id, items, total_amount: new.total_amount, status: OrderStatus::Pending,
            shipping_address: new.shipping_address, tracking_info: None,
            status_history: vec![StatusChange { status: OrderStatus::Pending, timestamp: now, message: Some("Order placed".into()) }],
            coupon_code: new.coupon_code, payment_id: new.payment_id, created_at: now, events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed { order_id: id, user_id: order.user_id, total: order.total_amount }));
        if let Some(code) = order.coupon_code.clone() {
            order.raise_event(DomainEvent::Coupon(CouponEvent::Redeemed { code }));
        }
        Ok(order)
    }

    pub fn restore(parts: OrderParts) -> Self {
        Self {
            id: parts.id, user_id: parts.user_id, items: parts.items, total_amount: parts.total_amount,
            status: parts.status, shipping_address: parts.shipping_address, tracking_info: parts.tracking_info,
            status_history: parts.status_history, coupon_code: parts.coupon_code, payment_id: parts.payment_id,
            created_at: parts.created_at, events: vec![],
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn user_id(&self) -> Option<Uuid> { self.user_id }
    pub fn items(&self) -> &[OrderItem] { &self.items }
    pub fn total_amount(&self) -> Decimal { self.total_amount }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn shipping_address(&self) -> &ShippingAddress { &self.shipping_address }
    pub fn tracking_info(&self) -> Option<&TrackingInfo> { self.tracking_info.as_ref() }
    pub fn status_history(&self) -> &[StatusChange] { &self.status_history }
    pub fn coupon_code(&self) -> Option<&CouponCode> { self.coupon_code.as_ref() }
    pub fn payment_id(&self) -> Option<&str> { self.payment_id.as_deref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn subtotal(&self) -> Decimal { self.items.iter().map(OrderItem::line_total).sum() }
    pub fn is_owned_by(&self, user_id: Uuid) -> bool { self.user_id == Some(user_id) }
    pub fn has_items_from(&self, seller_id: Uuid) -> bool { self.items.iter().any(|i| i.seller_id == seller_id) }

    /// Sets the status of the seller's line for `product_id` and re-derives the
    /// order status from all lines.
    pub fn set_item_status(&mut self, product_id: &str, seller_id: Uuid, status: OrderStatus, message: Option<String>, now: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.items.iter().any(|i| i.product_id == product_id) {
            return Err(OrderError::ItemNotFound(product_id.to_string()));
        }
        let item = self.items.iter_mut()
            .find(|i| i.product_id == product_id && i.seller_id == seller_id)
            .ok_or(OrderError::NotItemOwner)?;

        let previous = item.status;
        item.status = status;
        if previous != status {
            self.raise_event(DomainEvent::Order(OrderEvent::ItemStatusChanged {
                order_id: self.id, product_id: product_id.to_string(), seller_id, from: previous, to: status,
            }));
        }
        self.recalculate(message, now);
        Ok(())
    }

    pub fn set_tracking(&mut self, tracking: TrackingInfo) {
        self.raise_event(DomainEvent::Order(OrderEvent::TrackingUpdated {
            order_id: self.id, carrier: tracking.carrier.clone(), tracking_number: tracking.tracking_number.clone(),
        }));
        self.tracking_info = Some(tracking);
    }

    fn recalculate(&mut self, message: Option<String>, now: DateTime<Utc>) {
        let next = aggregate_status(self.items.iter().map(|i| i.status));
        if next == self.status { return; }
        let previous = std::mem::replace(&mut self.status, next);
        self.status_history.push(StatusChange { status: next, timestamp: now, message });
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id, from: previous, to: next }));
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Order must contain at least one item")]
    NoItems,
    #[error("Quantity for product {0} must be between 1 and 10000")]
    InvalidQuantity(String),
    #[error("Amounts cannot be negative")]
    NegativeAmount,
    #[error("Amount exceeds the maximum allowed")]
    AmountTooLarge,
    #[error("Item {0} not found in order")]
    ItemNotFound(String),
    #[error("Item belongs to another seller")]
    NotItemOwner,
}
