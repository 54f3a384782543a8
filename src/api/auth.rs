use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::auth::{issue_token, AuthUser};
use crate::domain::aggregates::{Role, User};
use crate::domain::value_objects::Email;
use crate::error::Result;
use crate::services::accounts;
use crate::AppState;

/// Emails are validated and stored without surrounding whitespace.
fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequest {
    #[serde(alias = "credential")]
    #[validate(length(min = 1, message = "Google id token is required"))]
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

fn respond(state: &AppState, user: User) -> Result<Json<AuthResponse>> {
    let token = issue_token(&state.config.jwt_secret, user.id, state.config.token_ttl_days, Utc::now())?;
    Ok(Json(AuthResponse { user, token }))
}

pub async fn register(State(s): State<AppState>, Json(body): Json<RegisterRequest>) -> Result<Json<AuthResponse>> {
    body.validate()?;
    let user = accounts::register(s.store.as_ref(), Email::new(body.email)?, &body.password, body.name, Utc::now()).await?;
    respond(&s, user)
}

pub async fn login(State(s): State<AppState>, Json(body): Json<LoginRequest>) -> Result<Json<AuthResponse>> {
    body.validate()?;
    let user = accounts::login(s.store.as_ref(), &Email::new(body.email)?, &body.password).await?;
    respond(&s, user)
}

pub async fn google(State(s): State<AppState>, Json(body): Json<GoogleRequest>) -> Result<Json<AuthResponse>> {
    body.validate()?;
    let profile = s.identity.verify(&body.id_token).await?;
    let user = accounts::google_sign_in(s.store.as_ref(), profile, Utc::now()).await?;
    respond(&s, user)
}

pub async fn set_role(State(s): State<AppState>, AuthUser(user): AuthUser, Json(body): Json<RoleRequest>) -> Result<Json<AuthResponse>> {
    let role: Role = body.role.trim().to_lowercase().parse()?;
    let user = accounts::set_role(s.store.as_ref(), user, role).await?;
    respond(&s, user)
}

pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
