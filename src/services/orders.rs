use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{coupons, record_all};
use crate::domain::aggregates::{NewOrder, Order, OrderItem, ShippingAddress, TrackingInfo};
use crate::domain::status::OrderStatus;
use crate::domain::value_objects::CouponCode;
use crate::error::{AppError, Result};
use crate::payments::{verify_payment, PaymentProof};
use crate::store::Store;

pub struct PlaceOrder {
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddress,
    pub coupon_code: Option<CouponCode>,
    pub payment: Option<PaymentProof>,
}

pub struct ItemStatusUpdate {
    pub status: OrderStatus,
    pub tracking_info: Option<TrackingInfo>,
    pub message: Option<String>,
}

/// Places an order for `user_id`, or a guest order when `None`.
///
/// A supplied payment proof must verify before anything is written. A supplied
/// coupon is validated up front and redeemed by the store together with the
/// insert, so a failed insert never consumes a use.
pub async fn place(store: &dyn Store, payment_secret: Option<&str>, user_id: Option<Uuid>, req: PlaceOrder, now: DateTime<Utc>) -> Result<Order> {
    let payment_id = match &req.payment {
        Some(proof) => {
            let secret = payment_secret.ok_or_else(|| AppError::ExternalService("Payment gateway is not configured".into()))?;
            verify_payment(secret, proof)?;
            Some(proof.razorpay_payment_id.clone())
        }
        None => None,
    };

    let mut order = Order::place(
        NewOrder {
            user_id,
            items: req.items,
            total_amount: req.total_amount,
            shipping_address: req.shipping_address,
            coupon_code: req.coupon_code.clone(),
            payment_id,
        },
        now,
    )?;

    let discount = match &req.coupon_code {
        Some(code) => coupons::validate(store, code.as_str(), now).await?.discount_on(order.subtotal()),
        None => Decimal::ZERO,
    };
    let expected = order.subtotal() - discount;
    if expected != order.total_amount() {
        tracing::warn!(order_id = %order.id(), %expected, submitted = %order.total_amount(), "order total differs from item prices");
    }

    if let Err(err) = store.insert_order(&order).await {
        if matches!(err, AppError::CouponExhausted) {
            tracing::info!(order_id = %order.id(), "coupon exhausted during redemption");
        }
        return Err(err);
    }
    record_all(order.take_events());
    Ok(order)
}

/// Sets the status of the seller's line in an order and re-derives the order
/// status. Tracking info, when given, replaces what the order had.
pub async fn update_item_status(
    store: &dyn Store,
    seller_id: Uuid,
    order_id: Uuid,
    product_id: &str,
    update: ItemStatusUpdate,
    now: DateTime<Utc>,
) -> Result<Order> {
    let mut order = store.order_by_id(order_id).await?.ok_or_else(|| AppError::not_found("Order not found"))?;
    order.set_item_status(product_id, seller_id, update.status, update.message, now)?;
    if let Some(tracking) = update.tracking_info {
        order.set_tracking(tracking);
    }
    store.save_order(&order).await?;
    record_all(order.take_events());
    Ok(order)
}

pub async fn my_orders(store: &dyn Store, user_id: Uuid) -> Result<Vec<Order>> {
    store.orders_for_user(user_id).await
}

pub async fn seller_orders(store: &dyn Store, seller_id: Uuid) -> Result<Vec<Order>> {
    store.orders_for_seller(seller_id).await
}

/// An order as seen by its owner. Anyone else gets not-found.
pub async fn order_for_user(store: &dyn Store, user_id: Uuid, order_id: Uuid) -> Result<Order> {
    store
        .order_by_id(order_id)
        .await?
        .filter(|o| o.is_owned_by(user_id))
        .ok_or_else(|| AppError::not_found("Order not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::order::tests::item;
    use crate::domain::aggregates::{Coupon, Product, Review, User};
    use crate::domain::analytics::SellerLine;
    use crate::domain::value_objects::{Email, Rating};
    use crate::payments::expected_signature;
    use crate::store::{CouponRepository, MemoryStore, OrderRepository, ProductRepository, ReviewRepository, ReviewWithAuthor, UserRepository};
    use async_trait::async_trait;
    use chrono::Duration;

    /// Delegates to a `MemoryStore`. Can serve coupons as they looked before
    /// any use was taken, and can refuse order writes outright.
    #[derive(Default)]
    struct Flaky {
        inner: MemoryStore,
        stale_coupons: bool,
        reject_orders: bool,
    }

    #[async_trait]
    impl UserRepository for Flaky {
        async fn insert_user(&self, user: &User) -> Result<()> { self.inner.insert_user(user).await }
        async fn save_user(&self, user: &User) -> Result<()> { self.inner.save_user(user).await }
        async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> { self.inner.user_by_id(id).await }
        async fn user_by_email(&self, email: &Email) -> Result<Option<User>> { self.inner.user_by_email(email).await }
        async fn user_by_google_subject(&self, subject: &str) -> Result<Option<User>> { self.inner.user_by_google_subject(subject).await }
    }

    #[async_trait]
    impl ProductRepository for Flaky {
        async fn insert_product(&self, product: &Product) -> Result<()> { self.inner.insert_product(product).await }
        async fn save_product(&self, product: &Product) -> Result<()> { self.inner.save_product(product).await }
        async fn delete_product(&self, id: Uuid) -> Result<()> { self.inner.delete_product(id).await }
        async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>> { self.inner.product_by_id(id).await }
        async fn list_products(&self) -> Result<Vec<Product>> { self.inner.list_products().await }
        async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>> { self.inner.products_by_ids(ids).await }
        async fn products_by_seller(&self, seller_id: Uuid) -> Result<Vec<Product>> { self.inner.products_by_seller(seller_id).await }
        async fn low_stock_products(&self, seller_id: Uuid, threshold: i32) -> Result<Vec<Product>> { self.inner.low_stock_products(seller_id, threshold).await }
        async fn set_product_rating(&self, id: Uuid, rating: f64, review_count: i32) -> Result<()> { self.inner.set_product_rating(id, rating, review_count).await }
    }

    #[async_trait]
    impl ReviewRepository for Flaky {
        async fn insert_review(&self, review: &Review) -> Result<()> { self.inner.insert_review(review).await }
        async fn delete_review(&self, id: Uuid) -> Result<()> { self.inner.delete_review(id).await }
        async fn review_by_id(&self, id: Uuid) -> Result<Option<Review>> { self.inner.review_by_id(id).await }
        async fn review_by_user_and_product(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>> { self.inner.review_by_user_and_product(user_id, product_id).await }
        async fn reviews_for_product(&self, product_id: Uuid) -> Result<Vec<ReviewWithAuthor>> { self.inner.reviews_for_product(product_id).await }
        async fn ratings_for_product(&self, product_id: Uuid) -> Result<Vec<Rating>> { self.inner.ratings_for_product(product_id).await }
    }

    #[async_trait]
    impl CouponRepository for Flaky {
        async fn insert_coupon(&self, coupon: &Coupon) -> Result<()> { self.inner.insert_coupon(coupon).await }
        async fn active_coupon(&self, code: &CouponCode) -> Result<Option<Coupon>> {
            let coupon = self.inner.active_coupon(code).await?;
            Ok(if self.stale_coupons { coupon.map(|c| Coupon { used_count: 0, ..c }) } else { coupon })
        }
    }

    #[async_trait]
    impl OrderRepository for Flaky {
        async fn insert_order(&self, order: &Order) -> Result<()> {
            if self.reject_orders { return Err(AppError::Internal("order write refused".into())); }
            self.inner.insert_order(order).await
        }
        async fn save_order(&self, order: &Order) -> Result<()> { self.inner.save_order(order).await }
        async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>> { self.inner.order_by_id(id).await }
        async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> { self.inner.orders_for_user(user_id).await }
        async fn orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<Order>> { self.inner.orders_for_seller(seller_id).await }
        async fn seller_lines(&self, seller_id: Uuid) -> Result<Vec<SellerLine>> { self.inner.seller_lines(seller_id).await }
    }

    async fn with_coupon(store: &Flaky, limit: Option<u32>) -> CouponCode {
        let code = CouponCode::new("ONCE").unwrap();
        store.inner.insert_coupon(&Coupon::new(code.clone(), 10, Utc::now() + Duration::days(1), limit).unwrap()).await.unwrap();
        code
    }

    fn request(items: Vec<OrderItem>, total: i64) -> PlaceOrder {
        PlaceOrder { items, total_amount: Decimal::new(total, 0), shipping_address: ShippingAddress::default(), coupon_code: None, payment: None }
    }

    #[tokio::test]
    async fn test_guest_order() {
        let store = MemoryStore::new();
        let order = place(&store, None, None, request(vec![item("A", Uuid::new_v4(), 10, 2)], 20), Utc::now()).await.unwrap();
        assert_eq!(order.user_id(), None);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(store.order_by_id(order.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_bad_signature_writes_nothing() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let proof = PaymentProof { razorpay_order_id: "order_1".into(), razorpay_payment_id: "pay_1".into(), razorpay_signature: "00".into() };
        let req = PlaceOrder { payment: Some(proof), ..request(vec![item("A", Uuid::new_v4(), 10, 1)], 10) };
        assert!(matches!(place(&store, Some("secret"), Some(user), req, Utc::now()).await, Err(AppError::PaymentVerification)));
        assert!(store.orders_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verified_payment_is_recorded() {
        let store = MemoryStore::new();
        let signature = expected_signature("secret", "order_1", "pay_1").unwrap();
        let proof = PaymentProof { razorpay_order_id: "order_1".into(), razorpay_payment_id: "pay_1".into(), razorpay_signature: signature };
        let req = PlaceOrder { payment: Some(proof), ..request(vec![item("A", Uuid::new_v4(), 10, 1)], 10) };
        let order = place(&store, Some("secret"), None, req, Utc::now()).await.unwrap();
        assert_eq!(order.payment_id(), Some("pay_1"));
    }

    #[tokio::test]
    async fn test_coupon_redeemed_on_order() {
        let store = MemoryStore::new();
        let code = CouponCode::new("ONCE").unwrap();
        store.insert_coupon(&Coupon::new(code.clone(), 10, Utc::now() + Duration::days(1), Some(1)).unwrap()).await.unwrap();
        let with_coupon = || PlaceOrder { coupon_code: Some(code.clone()), ..request(vec![item("A", Uuid::new_v4(), 200, 1)], 180) };
        place(&store, None, None, with_coupon(), Utc::now()).await.unwrap();
        assert!(matches!(place(&store, None, None, with_coupon(), Utc::now()).await, Err(AppError::CouponExhausted)));
        assert_eq!(store.active_coupon(&code).await.unwrap().unwrap().used_count, 1);
    }

    #[tokio::test]
    async fn test_failed_insert_keeps_coupon_use() {
        let store = Flaky { reject_orders: true, ..Flaky::default() };
        let code = with_coupon(&store, Some(1)).await;
        let user = Uuid::new_v4();
        let req = PlaceOrder { coupon_code: Some(code.clone()), ..request(vec![item("A", Uuid::new_v4(), 100, 1)], 90) };
        assert!(matches!(place(&store, None, Some(user), req, Utc::now()).await, Err(AppError::Internal(_))));
        assert_eq!(store.inner.active_coupon(&code).await.unwrap().unwrap().used_count, 0);
        assert!(store.inner.orders_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_last_use_taken_after_validation_writes_nothing() {
        let store = Flaky { stale_coupons: true, ..Flaky::default() };
        let code = with_coupon(&store, Some(1)).await;
        let user = Uuid::new_v4();
        let req = || PlaceOrder { coupon_code: Some(code.clone()), ..request(vec![item("A", Uuid::new_v4(), 100, 1)], 90) };
        place(&store, None, Some(user), req(), Utc::now()).await.unwrap();
        assert!(matches!(place(&store, None, Some(user), req(), Utc::now()).await, Err(AppError::CouponExhausted)));
        assert_eq!(store.inner.active_coupon(&code).await.unwrap().unwrap().used_count, 1);
        assert_eq!(store.inner.orders_for_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_lines_rejected() {
        let store = MemoryStore::new();
        let huge = OrderItem { price_at_purchase: Decimal::MAX, ..item("A", Uuid::new_v4(), 0, 2) };
        assert!(matches!(place(&store, None, None, request(vec![huge], 1), Utc::now()).await, Err(AppError::Validation(_))));
        let many = item("B", Uuid::new_v4(), 1, u32::MAX);
        assert!(matches!(place(&store, None, None, request(vec![many], 1), Utc::now()).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_item_status_update() {
        let store = MemoryStore::new();
        let (seller, other) = (Uuid::new_v4(), Uuid::new_v4());
        let order = place(&store, None, None, request(vec![item("A", seller, 10, 1), item("B", other, 5, 1)], 15), Utc::now()).await.unwrap();

        let update = |status| ItemStatusUpdate { status, tracking_info: None, message: None };
        let updated = update_item_status(&store, seller, order.id(), "A", update(OrderStatus::Delivered), Utc::now()).await.unwrap();
        assert_eq!(updated.status(), OrderStatus::Pending);

        let err = update_item_status(&store, seller, order.id(), "B", update(OrderStatus::Shipped), Utc::now()).await;
        assert!(matches!(err, Err(AppError::Forbidden(_))));
        let err = update_item_status(&store, seller, Uuid::new_v4(), "A", update(OrderStatus::Shipped), Utc::now()).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));

        let tracked = ItemStatusUpdate {
            status: OrderStatus::Shipped,
            tracking_info: Some(TrackingInfo { carrier: "BlueDart".into(), tracking_number: "BD123".into() }),
            message: None,
        };
        let updated = update_item_status(&store, other, order.id(), "B", tracked, Utc::now()).await.unwrap();
        assert_eq!(updated.status(), OrderStatus::Shipped);
        let stored = store.order_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.tracking_info().map(|t| t.carrier.as_str()), Some("BlueDart"));
    }

    #[tokio::test]
    async fn test_order_visible_only_to_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let order = place(&store, None, Some(owner), request(vec![item("A", Uuid::new_v4(), 10, 1)], 10), Utc::now()).await.unwrap();
        assert!(order_for_user(&store, owner, order.id()).await.is_ok());
        assert!(matches!(order_for_user(&store, Uuid::new_v4(), order.id()).await, Err(AppError::NotFound(_))));
    }
}
