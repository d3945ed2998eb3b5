//! Identity provider client.
//!
//! HTTP client for a GoTrue-compatible auth endpoint (`/auth/v1`). The
//! provider is an external collaborator; this module is the narrow interface
//! the session gate talks through. Session persistence is pluggable so each
//! front end chooses where sessions live.

use std::fmt;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{normalize_text_option, unix_timestamp_now};

const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Outcome of a sign-up: a live session, or a pending email confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationRequired,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Identity provider is not configured.")]
    NotConfigured,
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
    #[error("Not signed in")]
    SignedOut,
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where sessions live between runs (OS keychain, in-memory for tests).
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load(&self) -> AuthResult<Option<AuthSession>>;
    fn save(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear(&self) -> AuthResult<()>;
}

/// The operations the session gate needs from an identity provider.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Return the existing session, refreshing an expired one when possible.
    async fn restore_session(&self) -> AuthResult<Option<AuthSession>>;

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome>;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession>;

    async fn sign_out(&self, access_token: &str) -> AuthResult<()>;
}

/// HTTP client for the identity provider's auth endpoint.
#[derive(Clone)]
pub struct AuthClient<S: SessionPersistence> {
    auth_url: String,
    api_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> AuthClient<S> {
    pub fn new(url: impl AsRef<str>, api_key: impl Into<String>, store: S) -> AuthResult<Self> {
        let auth_url = normalize_auth_url(url.as_ref())?;
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Provider API key must not be empty",
            ));
        }

        Ok(Self {
            auth_url,
            api_key,
            client: Client::builder().build()?,
            store,
        })
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Refresh token must not be empty",
            ));
        }

        let payload = serde_json::json!({ "refresh_token": refresh_token });
        let request = self.public_request(
            self.client
                .post(format!("{}/token", self.auth_url))
                .query(&[("grant_type", "refresh_token")])
                .json(&payload),
        );
        let response = self.send_auth_request(request).await?;
        let session = response.into_session()?.ok_or_else(|| {
            AuthError::Api("Refresh response did not include an active session".to_string())
        })?;

        self.store.save(&session)?;
        Ok(session)
    }

    fn public_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send_auth_request(&self, request: RequestBuilder) -> AuthResult<ProviderAuthResponse> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_provider_error(status, &body)));
        }
        Ok(response.json::<ProviderAuthResponse>().await?)
    }
}

impl<S: SessionPersistence> IdentityProvider for AuthClient<S> {
    async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored) = self.store.load()? else {
            return Ok(None);
        };

        if !stored.is_expired() {
            return Ok(Some(stored));
        }

        match self.refresh_session(&stored.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.store.clear()?;
                Ok(None)
            }
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        require_credentials(email, password)?;

        let payload = serde_json::json!({ "email": email, "password": password });
        let request = self.public_request(
            self.client
                .post(format!("{}/signup", self.auth_url))
                .json(&payload),
        );
        let response = self.send_auth_request(request).await?;
        match response.into_session()? {
            Some(session) => {
                self.store.save(&session)?;
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        require_credentials(email, password)?;

        let payload = serde_json::json!({ "email": email, "password": password });
        let request = self.public_request(
            self.client
                .post(format!("{}/token", self.auth_url))
                .query(&[("grant_type", "password")])
                .json(&payload),
        );
        let response = self.send_auth_request(request).await?;
        let session = response.into_session()?.ok_or_else(|| {
            AuthError::Api("Sign-in response did not include an active session".to_string())
        })?;

        self.store.save(&session)?;
        Ok(session)
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let request = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token);

        let response = request.send().await?;
        // An already-invalid token still counts as signed out.
        if !(response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED) {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_provider_error(status, &body)));
        }

        self.store.clear()?;
        Ok(())
    }
}

pub fn normalize_auth_url(url: &str) -> AuthResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "Provider URL must not be empty",
        ));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(AuthError::InvalidConfiguration(
            "Provider URL must include http:// or https://",
        ));
    }
    if trimmed.ends_with("/auth/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/auth/v1"))
    }
}

/// Resolve an optional provider configuration pair.
///
/// Both URL and key must be present (or both absent); a half-configured
/// provider is an error rather than a silent no-auth mode.
pub fn resolve_optional_provider_config(
    url: Option<String>,
    api_key: Option<String>,
) -> AuthResult<Option<(String, String)>> {
    let url = normalize_text_option(url);
    let api_key = normalize_text_option(api_key);

    match (url, api_key) {
        (None, None) => Ok(None),
        (Some(url), Some(api_key)) => Ok(Some((url, api_key))),
        _ => Err(AuthError::NotConfigured),
    }
}

fn require_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::Api("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Api("Password is required".to_string()));
    }
    Ok(())
}

/// Raw auth endpoint payload. Sign-up responses may nest the session fields
/// one level down next to the user, so the shape is self-recursive.
#[derive(Debug, Default, Deserialize)]
struct ProviderAuthResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<ProviderUser>,
    #[serde(default)]
    session: Option<Box<ProviderAuthResponse>>,
}

impl ProviderAuthResponse {
    fn into_session(mut self) -> AuthResult<Option<AuthSession>> {
        if let Some(nested) = self.session.take() {
            let nested = *nested;
            self.access_token = self.access_token.or(nested.access_token);
            self.refresh_token = self.refresh_token.or(nested.refresh_token);
            self.expires_at = self.expires_at.or(nested.expires_at);
            self.expires_in = self.expires_in.or(nested.expires_in);
            self.user = self.user.or(nested.user);
        }

        let expires_at = self.expires_at.or_else(|| {
            self.expires_in
                .map(|expires_in| unix_timestamp_now().saturating_add(expires_in))
        });

        match (self.access_token, self.refresh_token, expires_at, self.user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user: user.into(),
                }))
            }
            // A user with no token material means confirmation is pending.
            (None, None, _, Some(_)) => Ok(None),
            _ => Err(AuthError::Api(
                "Auth response did not include enough session fields".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    email: Option<String>,
}

impl From<ProviderUser> for AuthUser {
    fn from(value: ProviderUser) -> Self {
        Self {
            id: value.id,
            email: value.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

fn parse_provider_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ProviderErrorResponse>(body) {
        if let Some(message) = payload
            .message
            .or(payload.msg)
            .or(payload.error_description)
            .or(payload.error)
        {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
