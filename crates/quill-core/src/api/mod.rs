//! Remote notes store client.
//!
//! HTTP client for the notes REST API. Every call attaches the bearer
//! credential currently held in the ephemeral token cell. Any non-2xx
//! response or transport failure surfaces as a uniform [`RequestError`];
//! one attempt per call, no retries, no timeouts.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Note, NoteDraft, NoteId};
use crate::util::{compact_text, is_http_url};

/// Default pagination for the full note list.
pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A failed remote request: HTTP status (when a response arrived) plus a
/// human-readable message. Transport failures carry no status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    pub status: Option<u16>,
    pub message: String,
}

impl RequestError {
    fn transport(error: &reqwest::Error) -> Self {
        Self {
            status: None,
            message: format!("Request failed: {error}"),
        }
    }

    fn invalid_body(error: &reqwest::Error) -> Self {
        Self {
            status: None,
            message: format!("Failed to parse response body: {error}"),
        }
    }

    fn api(status: StatusCode, body: &str) -> Self {
        Self {
            status: Some(status.as_u16()),
            message: parse_api_error(status, body),
        }
    }

    fn configuration(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// Ephemeral per-process bearer credential, shared between the session gate
/// and the store client. Cleared on sign-out or session loss; never written
/// to durable storage.
#[derive(Debug, Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        let mut slot = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(token.into());
    }

    pub fn clear(&self) {
        let mut slot = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Operations the note collection controller needs from a remote store.
#[allow(async_fn_in_trait)]
pub trait NoteStore {
    /// List notes, newest first, one page at a time.
    async fn list(&self, page: usize, page_size: usize) -> Result<Vec<Note>, RequestError>;

    /// Fetch a single note by id.
    async fn get(&self, id: &NoteId) -> Result<Note, RequestError>;

    /// Create a note; the store assigns id, title, and timestamps.
    async fn create(&self, draft: &NoteDraft) -> Result<Note, RequestError>;

    /// Replace a note's content and tags.
    async fn update(&self, id: &NoteId, draft: &NoteDraft) -> Result<Note, RequestError>;

    /// Delete a note. HTTP 204 is success with no body.
    async fn delete(&self, id: &NoteId) -> Result<(), RequestError>;

    /// Search notes by natural-language query.
    async fn search(&self, query: &str) -> Result<Vec<Note>, RequestError>;
}

/// `reqwest` implementation of [`NoteStore`] against the notes REST API.
#[derive(Debug, Clone)]
pub struct HttpNoteStore {
    base_url: String,
    client: Client,
    token: TokenCell,
}

impl HttpNoteStore {
    /// Build a store client for an explicit API base URL.
    pub fn new(base_url: impl Into<String>, token: TokenCell) -> Result<Self, RequestError> {
        let base_url = normalize_base_url(base_url.into().as_str())?;
        let client = Client::builder().build().map_err(|error| {
            RequestError::configuration(format!("Failed to construct HTTP client: {error}"))
        })?;
        Ok(Self {
            base_url,
            client,
            token,
        })
    }

    /// Returns the base URL this client was configured with.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RequestError> {
        let response = request
            .send()
            .await
            .map_err(|error| RequestError::transport(&error))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(RequestError::api(status, &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RequestError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|error| RequestError::invalid_body(&error))
    }
}

impl NoteStore for HttpNoteStore {
    async fn list(&self, page: usize, page_size: usize) -> Result<Vec<Note>, RequestError> {
        let url = format!(
            "{}/notes/?page={page}&page_size={page_size}",
            self.base_url
        );
        self.send_json(self.authorized(self.client.get(url))).await
    }

    async fn get(&self, id: &NoteId) -> Result<Note, RequestError> {
        let url = format!("{}/notes/{id}", self.base_url);
        self.send_json(self.authorized(self.client.get(url))).await
    }

    async fn create(&self, draft: &NoteDraft) -> Result<Note, RequestError> {
        let url = format!("{}/notes/", self.base_url);
        self.send_json(self.authorized(self.client.post(url)).json(draft))
            .await
    }

    async fn update(&self, id: &NoteId, draft: &NoteDraft) -> Result<Note, RequestError> {
        let url = format!("{}/notes/{id}", self.base_url);
        self.send_json(self.authorized(self.client.put(url)).json(draft))
            .await
    }

    async fn delete(&self, id: &NoteId) -> Result<(), RequestError> {
        let url = format!("{}/notes/{id}", self.base_url);
        self.send(self.authorized(self.client.delete(url))).await?;
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Note>, RequestError> {
        let url = format!(
            "{}/notes/search?q={}",
            self.base_url,
            urlencoding::encode(query)
        );
        self.send_json(self.authorized(self.client.get(url))).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    detail: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorResponse>(body) {
        if let Some(message) = payload.detail.or(payload.message).or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact_text(trimmed), status.as_u16())
    }
}

fn normalize_base_url(raw: &str) -> Result<String, RequestError> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(RequestError::configuration(
            "API base URL must not be empty",
        ));
    }
    if !is_http_url(&base) {
        return Err(RequestError::configuration(
            "API base URL must include http:// or https://",
        ));
    }
    Ok(base)
}
