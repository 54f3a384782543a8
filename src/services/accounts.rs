use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::domain::aggregates::{AddressInput, GoogleProfile, Product, Role, SavedAddress, User};
use crate::domain::value_objects::Email;
use crate::error::{AppError, Result};
use crate::store::Store;

pub async fn register(store: &dyn Store, email: Email, password: &str, name: Option<String>, now: DateTime<Utc>) -> Result<User> {
    if store.user_by_email(&email).await?.is_some() {
        return Err(AppError::validation("Email already in use"));
    }
    let user = User::with_password(email, hash_password(password)?, name, now);
    store.insert_user(&user).await?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok(user)
}

pub async fn login(store: &dyn Store, email: &Email, password: &str) -> Result<User> {
    let invalid = || AppError::Unauthorized("Invalid email or password".into());
    let user = store.user_by_email(email).await?.ok_or_else(invalid)?;
    match user.password_hash() {
        Some(hash) if verify_password(password, hash) => Ok(user),
        _ => Err(invalid()),
    }
}

/// Signs in with a verified Google profile: by subject, then by email, and
/// creates a customer account when neither matches.
pub async fn google_sign_in(store: &dyn Store, profile: GoogleProfile, now: DateTime<Utc>) -> Result<User> {
    let existing = match store.user_by_google_subject(&profile.subject).await? {
        Some(user) => Some(user),
        None => store.user_by_email(&profile.email).await?,
    };
    match existing {
        Some(mut user) => {
            if user.refresh_picture(profile.picture) {
                store.save_user(&user).await?;
            }
            Ok(user)
        }
        None => {
            let user = User::from_google(profile, now);
            store.insert_user(&user).await?;
            tracing::info!(user_id = %user.id, "user registered via google");
            Ok(user)
        }
    }
}

pub async fn set_role(store: &dyn Store, mut user: User, role: Role) -> Result<User> {
    if user.role != role {
        user.role = role;
        store.save_user(&user).await?;
        tracing::info!(user_id = %user.id, %role, "role changed");
    }
    Ok(user)
}

pub async fn wishlist(store: &dyn Store, user: &User) -> Result<Vec<Product>> {
    store.products_by_ids(&user.wishlist).await
}

/// Returns whether the product is wishlisted afterwards.
pub async fn toggle_wishlist(store: &dyn Store, mut user: User, product_id: Uuid) -> Result<bool> {
    if store.product_by_id(product_id).await?.is_none() {
        return Err(AppError::not_found("Product not found"));
    }
    let wishlisted = user.toggle_wishlist(product_id);
    store.save_user(&user).await?;
    Ok(wishlisted)
}

pub async fn add_address(store: &dyn Store, mut user: User, input: AddressInput) -> Result<Vec<SavedAddress>> {
    user.add_address(input);
    store.save_user(&user).await?;
    Ok(user.addresses)
}

pub async fn remove_address(store: &dyn Store, mut user: User, address_id: Uuid) -> Result<Vec<SavedAddress>> {
    user.remove_address(address_id)?;
    store.save_user(&user).await?;
    Ok(user.addresses)
}
