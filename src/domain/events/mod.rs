//! Domain events
use crate::domain::status::OrderStatus;
use crate::domain::value_objects::CouponCode;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Order(OrderEvent),
    Review(ReviewEvent),
    Coupon(CouponEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrderEvent {
    Placed { order_id: Uuid, user_id: Option<Uuid>, total: Decimal },
    ItemStatusChanged { order_id: Uuid, product_id: String, seller_id: Uuid, from: OrderStatus, to: OrderStatus },
    StatusChanged { order_id: Uuid, from: OrderStatus, to: OrderStatus },
    TrackingUpdated { order_id: Uuid, carrier: String, tracking_number: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReviewEvent {
    Posted { review_id: Uuid, product_id: Uuid, rating: u8 },
    Removed { review_id: Uuid, product_id: Uuid },
}

#[derive(Clone, Debug, PartialEq)]
pub enum CouponEvent {
    Redeemed { code: CouponCode },
}

impl DomainEvent {
    /// Emits the event as a structured log line.
    pub fn record(&self) {
        match self {
            DomainEvent::Order(OrderEvent::Placed { order_id, user_id, total }) => {
                tracing::info!(%order_id, user_id = ?user_id, %total, "order placed")
            }
            DomainEvent::Order(OrderEvent::ItemStatusChanged { order_id, product_id, seller_id, from, to }) => {
                tracing::info!(%order_id, %product_id, %seller_id, %from, %to, "order item status changed")
            }
            DomainEvent::Order(OrderEvent::StatusChanged { order_id, from, to }) => {
                tracing::info!(%order_id, %from, %to, "order status changed")
            }
            DomainEvent::Order(OrderEvent::TrackingUpdated { order_id, carrier, tracking_number }) => {
                tracing::info!(%order_id, %carrier, %tracking_number, "tracking info updated")
            }
            DomainEvent::Review(ReviewEvent::Posted { review_id, product_id, rating }) => {
                tracing::info!(%review_id, %product_id, rating, "review posted")
            }
            DomainEvent::Review(ReviewEvent::Removed { review_id, product_id }) => {
                tracing::info!(%review_id, %product_id, "review removed")
            }
            DomainEvent::Coupon(CouponEvent::Redeemed { code }) => {
                tracing::info!(%code, "coupon redeemed")
            }
        }
    }
}
