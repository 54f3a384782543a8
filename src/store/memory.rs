//! In-process store for tests and database-less local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CouponRepository, OrderRepository, ProductRepository, ReviewRepository, ReviewWithAuthor, UserRepository};
use crate::domain::aggregates::{Coupon, Order, Product, Review, User};
use crate::domain::analytics::SellerLine;
use crate::domain::value_objects::{CouponCode, Email, Rating};
use crate::error::{AppError, Result};

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    products: HashMap<Uuid, Product>,
    reviews: HashMap<Uuid, Review>,
    coupons: HashMap<CouponCode, Coupon>,
    orders: HashMap<Uuid, Order>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then_with(|| b.id().cmp(&a.id())));
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut db = self.inner.write().await;
        if db.users.values().any(|u| u.email == user.email) {
            return Err(AppError::validation("Email already in use"));
        }
        db.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let mut db = self.inner.write().await;
        if !db.users.contains_key(&user.id) { return Err(AppError::not_found("User not found")); }
        db.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.values().find(|u| &u.email == email).cloned())
    }

    async fn user_by_google_subject(&self, subject: &str) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.values().find(|u| u.google_subject() == Some(subject)).cloned())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.inner.write().await.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn save_product(&self, product: &Product) -> Result<()> {
        let mut db = self.inner.write().await;
        match db.products.get_mut(&product.id) {
            Some(existing) => { *existing = product.clone(); Ok(()) }
            None => Err(AppError::not_found("Product not found")),
        }
    }

    async fn delete_product(&self, id: Uuid) -> Result<()> {
        self.inner.write().await.products.remove(&id);
        Ok(())
    }

    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.inner.read().await.products.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(products)
    }

    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let db = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| db.products.get(id).cloned()).collect())
    }

    async fn products_by_seller(&self, seller_id: Uuid) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.inner.read().await.products.values().filter(|p| p.is_owned_by(seller_id)).cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(products)
    }

    async fn low_stock_products(&self, seller_id: Uuid, threshold: i32) -> Result<Vec<Product>> {
        let db = self.inner.read().await;
        Ok(db.products.values().filter(|p| p.is_owned_by(seller_id) && p.is_low_stock(threshold)).cloned().collect())
    }

    async fn set_product_rating(&self, id: Uuid, rating: f64, review_count: i32) -> Result<()> {
        if let Some(p) = self.inner.write().await.products.get_mut(&id) {
            p.rating = rating;
            p.review_count = review_count;
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn insert_review(&self, review: &Review) -> Result<()> {
        let mut db = self.inner.write().await;
        if db.reviews.values().any(|r| r.user_id == review.user_id && r.product_id == review.product_id) {
            return Err(AppError::validation("You have already reviewed this product"));
        }
        db.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn delete_review(&self, id: Uuid) -> Result<()> {
        self.inner.write().await.reviews.remove(&id);
        Ok(())
    }

    async fn review_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        Ok(self.inner.read().await.reviews.get(&id).cloned())
    }

    async fn review_by_user_and_product(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>> {
        Ok(self.inner.read().await.reviews.values().find(|r| r.user_id == user_id && r.product_id == product_id).cloned())
    }

    async fn reviews_for_product(&self, product_id: Uuid) -> Result<Vec<ReviewWithAuthor>> {
        let db = self.inner.read().await;
        let mut reviews: Vec<ReviewWithAuthor> = db.reviews.values()
            .filter(|r| r.product_id == product_id)
            .map(|r| ReviewWithAuthor { review: r.clone(), user_name: db.users.get(&r.user_id).and_then(|u| u.name.clone()) })
            .collect();
        reviews.sort_by(|a, b| b.review.created_at.cmp(&a.review.created_at).then_with(|| b.review.id.cmp(&a.review.id)));
        Ok(reviews)
    }

    async fn ratings_for_product(&self, product_id: Uuid) -> Result<Vec<Rating>> {
        Ok(self.inner.read().await.reviews.values().filter(|r| r.product_id == product_id).map(|r| r.rating).collect())
    }
}

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn insert_coupon(&self, coupon: &Coupon) -> Result<()> {
        let mut db = self.inner.write().await;
        if db.coupons.contains_key(&coupon.code) {
            return Err(AppError::validation(format!("Coupon {} already exists", coupon.code)));
        }
        db.coupons.insert(coupon.code.clone(), coupon.clone());
        Ok(())
    }

    async fn active_coupon(&self, code: &CouponCode) -> Result<Option<Coupon>> {
        Ok(self.inner.read().await.coupons.get(code).filter(|c| c.is_active).cloned())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        let mut db = self.inner.write().await;
        if let Some(code) = order.coupon_code() {
            match db.coupons.get_mut(code) {
                Some(c) if c.is_active && !c.is_exhausted() => c.used_count += 1,
                _ => return Err(AppError::CouponExhausted),
            }
        }
        db.orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn save_order(&self, order: &Order) -> Result<()> {
        let mut db = self.inner.write().await;
        match db.orders.get_mut(&order.id()) {
            Some(existing) => { *existing = order.clone(); Ok(()) }
            None => Err(AppError::not_found("Order not found")),
        }
    }

    async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.inner.read().await.orders.values().filter(|o| o.is_owned_by(user_id)).cloned().collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.inner.read().await.orders.values().filter(|o| o.has_items_from(seller_id)).cloned().collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn seller_lines(&self, seller_id: Uuid) -> Result<Vec<SellerLine>> {
        let db = self.inner.read().await;
        Ok(SellerLine::from_orders(db.orders.values(), seller_id))
    }
}
