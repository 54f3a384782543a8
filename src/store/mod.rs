//! Persistence seams, one repository trait per collection.
//!
//! Writes are single-document and last-write-wins. The only conditional write
//! is the coupon redemption inside `insert_order`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::aggregates::{Coupon, Order, Product, Review, User};
use crate::domain::analytics::SellerLine;
use crate::domain::value_objects::{CouponCode, Email, Rating};
use crate::error::Result;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn save_user(&self, user: &User) -> Result<()>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn user_by_email(&self, email: &Email) -> Result<Option<User>>;
    async fn user_by_google_subject(&self, subject: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert_product(&self, product: &Product) -> Result<()>;
    async fn save_product(&self, product: &Product) -> Result<()>;
    async fn delete_product(&self, id: Uuid) -> Result<()>;
    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>>;
    /// Newest first.
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
    async fn products_by_seller(&self, seller_id: Uuid) -> Result<Vec<Product>>;
    /// The seller's products with `stock <= threshold`.
    async fn low_stock_products(&self, seller_id: Uuid, threshold: i32) -> Result<Vec<Product>>;
    async fn set_product_rating(&self, id: Uuid, rating: f64, review_count: i32) -> Result<()>;
}

/// A review joined with its author's display name.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: Review,
    pub user_name: Option<String>,
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert_review(&self, review: &Review) -> Result<()>;
    async fn delete_review(&self, id: Uuid) -> Result<()>;
    async fn review_by_id(&self, id: Uuid) -> Result<Option<Review>>;
    async fn review_by_user_and_product(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>>;
    /// Newest first.
    async fn reviews_for_product(&self, product_id: Uuid) -> Result<Vec<ReviewWithAuthor>>;
    async fn ratings_for_product(&self, product_id: Uuid) -> Result<Vec<Rating>>;
}

#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn insert_coupon(&self, coupon: &Coupon) -> Result<()>;
    async fn active_coupon(&self, code: &CouponCode) -> Result<Option<Coupon>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the order. When it carries a coupon code, one use is redeemed in
    /// the same unit of work, unless the coupon is inactive or at its limit, in
    /// which case nothing is written and the result is `CouponExhausted`.
    async fn insert_order(&self, order: &Order) -> Result<()>;
    /// Persists status, item statuses, tracking info and history.
    async fn save_order(&self, order: &Order) -> Result<()>;
    async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>>;
    /// Newest first.
    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;
    /// Whole orders with at least one of the seller's items, newest first.
    async fn orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<Order>>;
    /// Every line item attributed to the seller across all orders.
    async fn seller_lines(&self, seller_id: Uuid) -> Result<Vec<SellerLine>>;
}

pub trait Store: UserRepository + ProductRepository + ReviewRepository + CouponRepository + OrderRepository {}

impl<T> Store for T where T: UserRepository + ProductRepository + ReviewRepository + CouponRepository + OrderRepository {}
