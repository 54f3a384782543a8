//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::value_objects::MAX_AMOUNT;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub category: String,
    pub images: Vec<String>,
    pub rating: f64,
    pub review_count: i32,
    pub stock: i32,
    pub badge: Option<String>,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Seller-editable fields. Rating and review count are never set directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub badge: Option<String>,
}

impl ProductDraft {
    fn validate(self) -> Result<Self, ProductError> {
        let title = self.title.trim().to_string();
        if title.is_empty() { return Err(ProductError::MissingTitle); }
        if self.description.trim().is_empty() { return Err(ProductError::MissingDescription); }
        if self.category.trim().is_empty() { return Err(ProductError::MissingCategory); }
        if self.price <= Decimal::ZERO { return Err(ProductError::InvalidPrice); }
        if self.price > MAX_AMOUNT || self.original_price.is_some_and(|p| p > MAX_AMOUNT) { return Err(ProductError::PriceTooHigh); }
        if self.stock < 0 { return Err(ProductError::NegativeStock); }
        Ok(Self { title, ..self })
    }
}

impl Product {
    pub fn create(seller_id: Uuid, draft: ProductDraft, now: DateTime<Utc>) -> Result<Self, ProductError> {
        let d = draft.validate()?;
        Ok(Self {
            id: Uuid::now_v7(), title: d.title, description: d.description, price: d.price,
            original_price: d.original_price, category: d.category, images: d.images,
            rating: 0.0, review_count: 0, stock: d.stock, badge: d.badge, seller_id, created_at: now,
        })
    }

    pub fn revise(&mut self, draft: ProductDraft) -> Result<(), ProductError> {
        let d = draft.validate()?;
        self.title = d.title;
        self.description = d.description;
        self.price = d.price;
        self.original_price = d.original_price;
        self.category = d.category;
        self.images = d.images;
        self.stock = d.stock;
        self.badge = d.badge;
        Ok(())
    }

    pub fn is_owned_by(&self, seller_id: Uuid) -> bool { self.seller_id == seller_id }
    pub fn is_low_stock(&self, threshold: i32) -> bool { self.stock <= threshold }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Description is required")]
    MissingDescription,
    #[error("Category is required")]
    MissingCategory,
    #[error("Price must be greater than zero")]
    InvalidPrice,
    #[error("Price is too high")]
    PriceTooHigh,
    #[error("Stock cannot be negative")]
    NegativeStock,
}
