use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::Message;
use crate::auth::AuthUser;
use crate::domain::aggregates::Review;
use crate::domain::value_objects::Rating;
use crate::error::{AppError, Result};
use crate::services::reviews;
use crate::store::ReviewWithAuthor;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub product: Uuid,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: String,
}

pub async fn create(State(s): State<AppState>, AuthUser(user): AuthUser, Json(body): Json<ReviewRequest>) -> Result<(StatusCode, Json<Review>)> {
    let rating = Rating::new(body.rating.ok_or_else(|| AppError::validation("Rating is required"))?)?;
    let review = reviews::post(s.store.as_ref(), user.id, body.product, rating, &body.comment, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn for_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Vec<ReviewWithAuthor>>> {
    Ok(Json(reviews::for_product(s.store.as_ref(), id).await?))
}

pub async fn remove(State(s): State<AppState>, AuthUser(user): AuthUser, Path(id): Path<Uuid>) -> Result<Json<Message>> {
    reviews::remove(s.store.as_ref(), user.id, id).await?;
    Ok(Message::new("Review removed"))
}
