//! Error types for quill-core

use thiserror::Error;

/// Result type alias using quill-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quill-core operations.
///
/// All three are caught at the point of use and rendered as notifications;
/// none are meant to reach a global handler.
#[derive(Debug, Error)]
pub enum Error {
    /// Remote store request failed (non-2xx or transport failure)
    #[error(transparent)]
    Request(#[from] crate::api::RequestError),

    /// Local payload rejected before any network call
    #[error(transparent)]
    Validation(#[from] crate::validate::ValidationError),

    /// Identity provider operation failed
    #[error(transparent)]
    Auth(#[from] crate::auth::AuthError),
}
