use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config;

/// The authenticated identity behind a bearer token, as reported by the
/// external identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: Option<String>,
}

/// Errors from the identity provider collaborator itself
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Identity provider rejected the request: {0}")]
    Rejected(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Authentication outcome for the current request
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token in Authorization header")]
    MissingCredential,

    #[error("Invalid or expired token: {0}")]
    InvalidCredential(String),

    #[error("Authenticated user has no email address")]
    UnverifiedIdentity,
}

/// Capability interface over the external identity provider: token
/// verification for API requests, code exchange for the login callback.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<Principal, ProviderError>;

    async fn exchange_code(&self, code: &str) -> Result<(), ProviderError>;
}

/// Exchange the request's bearer credential for a verified, lowercased
/// email address. Every downstream comparison and stored owner identity
/// uses the normalized form.
pub async fn verify_bearer(
    provider: &dyn IdentityProvider,
    headers: &HeaderMap,
) -> Result<String, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingCredential)?;

    let principal = provider
        .verify_token(&token)
        .await
        .map_err(|e| AuthError::InvalidCredential(e.to_string()))?;

    match principal.email {
        Some(email) if !email.trim().is_empty() => Ok(email.trim().to_lowercase()),
        _ => Err(AuthError::UnverifiedIdentity),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.trim().is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// HTTP client for a GoTrue-style identity provider.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn from_config() -> Result<Self, url::ParseError> {
        let auth = &config::config().auth;
        let base_url = Url::parse(&auth.base_url)?;
        Ok(Self::new(base_url, auth.api_key.clone()))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Rejected(format!("invalid endpoint {}: {}", path, e)))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Principal, ProviderError> {
        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("apikey", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Rejected(format!(
                "token verification returned {}",
                response.status()
            )));
        }

        Ok(response.json::<Principal>().await?)
    }

    async fn exchange_code(&self, code: &str) -> Result<(), ProviderError> {
        let url = self.endpoint("auth/v1/token?grant_type=pkce")?;
        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "auth_code": code }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Rejected(format!(
                "code exchange returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
