use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domain::aggregates::{AddressInput, Product, SavedAddress};
use crate::error::Result;
use crate::services::accounts;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistToggle {
    pub msg: &'static str,
    pub is_wishlisted: bool,
}

pub async fn wishlist(State(s): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Vec<Product>>> {
    Ok(Json(accounts::wishlist(s.store.as_ref(), &user).await?))
}

pub async fn toggle_wishlist(State(s): State<AppState>, AuthUser(user): AuthUser, Path(id): Path<Uuid>) -> Result<Json<WishlistToggle>> {
    let is_wishlisted = accounts::toggle_wishlist(s.store.as_ref(), user, id).await?;
    let msg = if is_wishlisted { "Product added to wishlist" } else { "Product removed from wishlist" };
    Ok(Json(WishlistToggle { msg, is_wishlisted }))
}

pub async fn addresses(AuthUser(user): AuthUser) -> Json<Vec<SavedAddress>> {
    Json(user.addresses)
}

pub async fn add_address(State(s): State<AppState>, AuthUser(user): AuthUser, Json(input): Json<AddressInput>) -> Result<Json<Vec<SavedAddress>>> {
    Ok(Json(accounts::add_address(s.store.as_ref(), user, input).await?))
}

pub async fn remove_address(State(s): State<AppState>, AuthUser(user): AuthUser, Path(id): Path<Uuid>) -> Result<Json<Vec<SavedAddress>>> {
    Ok(Json(accounts::remove_address(s.store.as_ref(), user, id).await?))
}
