//! Bearer-token authentication: JWT issue/verify, password hashing and the
//! request extractors handlers use to require a user or a seller.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::User;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(secret: &str, user_id: Uuid, ttl_days: i64, now: DateTime<Utc>) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(ttl_days)).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::Internal(format!("token encoding: {e}")))
}

/// Returns the user id carried by a valid, unexpired token.
pub fn verify_token(secret: &str, token: &str) -> Result<Uuid> {
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::new(Algorithm::HS256))
        .map_err(|_| unauthenticated())?;
    Uuid::parse_str(&data.claims.sub).map_err(|_| unauthenticated())
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

fn unauthenticated() -> AppError { AppError::Unauthorized("Please authenticate.".into()) }

fn bearer(parts: &Parts) -> Option<&str> {
    parts.headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<User> {
    let token = bearer(parts).ok_or_else(unauthenticated)?;
    let user_id = verify_token(&state.config.jwt_secret, token)?;
    state.store.user_by_id(user_id).await?.ok_or_else(unauthenticated)
}

/// A signed-in user. Rejects with 401.
pub struct AuthUser(pub User);

/// The caller if a valid token is present. Invalid or missing tokens mean guest.
pub struct MaybeAuthUser(pub Option<User>);

/// A signed-in user with the seller role. Customers get 403.
pub struct SellerUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        resolve(parts, state).await.map(AuthUser)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match resolve(parts, state).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(AppError::Unauthorized(_)) => Ok(MaybeAuthUser(None)),
            Err(other) => Err(other),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for SellerUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = resolve(parts, state).await?;
        if !user.is_seller() {
            return Err(AppError::forbidden("Access denied."));
        }
        Ok(SellerUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let id = Uuid::new_v4();
        let token = issue_token("secret", id, 7, Utc::now()).unwrap();
        assert_eq!(verify_token("secret", &token).unwrap(), id);
        assert!(matches!(verify_token("other", &token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token("secret", Uuid::new_v4(), 7, Utc::now() - Duration::days(8)).unwrap();
        assert!(verify_token("secret", &token).is_err());
    }

    #[test]
    fn test_password_hash() {
        let hash = hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-phc-string"));
    }
}
