//! Application configuration, read once at startup.
//!
//! Holds the safe-to-ship public endpoints the client needs: the notes API
//! base URL and, when auth is enabled, the identity provider URL and public
//! API key. Secret credentials never live here.

use crate::util::{is_http_url, normalize_text_option};

/// Fallback for local development when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_APP_NAME: &str = "Quill";

/// Resolved client configuration. No runtime reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub provider_url: Option<String>,
    pub provider_api_key: Option<String>,
    pub app_name: String,
    pub app_version: String,
}

impl AppConfig {
    /// Build a configuration from explicit values, normalizing URLs.
    pub fn new(
        api_base_url: impl Into<String>,
        provider_url: Option<String>,
        provider_api_key: Option<String>,
    ) -> Result<Self, String> {
        let api_base_url = normalize_required_http_url(api_base_url.into(), "API base URL")?;
        let provider_url = normalize_text_option(provider_url)
            .map(|url| normalize_required_http_url(url, "provider URL"))
            .transpose()?;

        Ok(Self {
            api_base_url,
            provider_url,
            provider_api_key: normalize_text_option(provider_api_key),
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Override the display name (front ends may brand themselves).
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        if let Some(name) = normalize_text_option(Some(name.into())) {
            self.app_name = name;
        }
        self
    }
}

fn normalize_required_http_url(raw: String, field: &str) -> Result<String, String> {
    let value = raw.trim().trim_end_matches('/').to_string();
    if value.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if !is_http_url(&value) {
        return Err(format!("{field} must include http:// or https://"));
    }
    Ok(value)
}
