use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::aggregates::{RatingSummary, Review};
use crate::domain::events::{DomainEvent, ReviewEvent};
use crate::domain::value_objects::Rating;
use crate::error::{AppError, Result};
use crate::store::{ReviewWithAuthor, Store};

/// Posts a review and refreshes the product's rating. The insert and the
/// refresh are separate writes.
pub async fn post(store: &dyn Store, user_id: Uuid, product_id: Uuid, rating: Rating, comment: &str, now: DateTime<Utc>) -> Result<Review> {
    if store.product_by_id(product_id).await?.is_none() {
        return Err(AppError::not_found("Product not found"));
    }
    if store.review_by_user_and_product(user_id, product_id).await?.is_some() {
        return Err(AppError::validation("You have already reviewed this product"));
    }
    let (review, event) = Review::post(user_id, product_id, rating, comment, now)?;
    store.insert_review(&review).await?;
    event.record();
    refresh_rating(store, product_id).await?;
    Ok(review)
}

pub async fn for_product(store: &dyn Store, product_id: Uuid) -> Result<Vec<ReviewWithAuthor>> {
    store.reviews_for_product(product_id).await
}

/// Deletes the caller's own review and refreshes the product's rating.
pub async fn remove(store: &dyn Store, user_id: Uuid, review_id: Uuid) -> Result<()> {
    let review = store.review_by_id(review_id).await?.ok_or_else(|| AppError::not_found("Review not found"))?;
    if review.user_id != user_id {
        return Err(AppError::forbidden("Not authorized to delete this review"));
    }
    store.delete_review(review_id).await?;
    DomainEvent::Review(ReviewEvent::Removed { review_id, product_id: review.product_id }).record();
    refresh_rating(store, review.product_id).await
}

async fn refresh_rating(store: &dyn Store, product_id: Uuid) -> Result<()> {
    let summary = RatingSummary::from_ratings(store.ratings_for_product(product_id).await?);
    store.set_product_rating(product_id, summary.average, summary.count).await
}
