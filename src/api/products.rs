use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use super::Message;
use crate::auth::SellerUser;
use crate::domain::aggregates::{Product, ProductDraft};
use crate::error::Result;
use crate::services::catalog;
use crate::AppState;

pub async fn list(State(s): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(catalog::list(s.store.as_ref()).await?))
}

pub async fn get(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Product>> {
    Ok(Json(catalog::get(s.store.as_ref(), id).await?))
}

pub async fn seller_products(State(s): State<AppState>, SellerUser(seller): SellerUser) -> Result<Json<Vec<Product>>> {
    Ok(Json(catalog::seller_products(s.store.as_ref(), seller.id).await?))
}

pub async fn create(State(s): State<AppState>, SellerUser(seller): SellerUser, Json(draft): Json<ProductDraft>) -> Result<(StatusCode, Json<Product>)> {
    let product = catalog::create(s.store.as_ref(), seller.id, draft, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(State(s): State<AppState>, SellerUser(seller): SellerUser, Path(id): Path<Uuid>, Json(draft): Json<ProductDraft>) -> Result<Json<Product>> {
    Ok(Json(catalog::update(s.store.as_ref(), seller.id, id, draft).await?))
}

pub async fn remove(State(s): State<AppState>, SellerUser(seller): SellerUser, Path(id): Path<Uuid>) -> Result<Json<Message>> {
    catalog::delete(s.store.as_ref(), seller.id, id).await?;
    Ok(Message::new("Product removed"))
}
