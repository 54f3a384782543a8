//! Google sign-in: id token verification behind a trait so tests can stub it.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::aggregates::GoogleProfile;
use crate::domain::value_objects::Email;
use crate::error::{AppError, Result};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<GoogleProfile>;
}

/// Verifies tokens with Google's tokeninfo endpoint and checks the audience.
pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: String,
    #[serde(default)]
    email_verified: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl GoogleVerifier {
    pub fn new(client_id: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("http client: {e}")))?;
        Ok(Self { http, client_id })
    }
}

fn rejected() -> AppError { AppError::Unauthorized("Google authentication failed".into()) }

impl TokenInfo {
    fn into_profile(self, client_id: &str) -> Result<GoogleProfile> {
        if self.aud != client_id { return Err(rejected()); }
        if self.email_verified.as_deref() == Some("false") { return Err(rejected()); }
        let email = Email::new(self.email).map_err(|_| rejected())?;
        Ok(GoogleProfile { subject: self.sub, email, name: self.name, picture: self.picture })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleProfile> {
        let client_id = self.client_id.as_deref()
            .ok_or_else(|| AppError::ExternalService("Google sign-in is not configured".into()))?;
        let response = self.http
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Google token check failed: {e}")))?;
        if !response.status().is_success() {
            return Err(rejected());
        }
        let info: TokenInfo = response.json().await.map_err(|_| rejected())?;
        info.into_profile(client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str, verified: Option<&str>) -> TokenInfo {
        TokenInfo { aud: aud.into(), sub: "1234".into(), email: "Ada@Example.com".into(), email_verified: verified.map(Into::into), name: Some("Ada".into()), picture: None }
    }

    #[test]
    fn test_audience_must_match() {
        assert!(info("other-client", Some("true")).into_profile("my-client").is_err());
        let profile = info("my-client", Some("true")).into_profile("my-client").unwrap();
        assert_eq!(profile.email.as_str(), "ada@example.com");
        assert_eq!(profile.subject, "1234");
    }

    #[test]
    fn test_unverified_email_rejected() {
        assert!(info("my-client", Some("false")).into_profile("my-client").is_err());
    }
}
