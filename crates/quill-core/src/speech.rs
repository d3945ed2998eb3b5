//! Optional speech-to-text input.
//!
//! Speech capture is an external collaborator that is not present on every
//! platform. Front ends hold a [`SpeechInput`] implementation and check
//! availability before starting a capture; [`SpeechUnavailable`] stands in
//! where no engine exists.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech input is not available on this platform")]
    Unavailable,
    #[error("Speech capture failed: {0}")]
    Capture(String),
}

/// A speech capture source delivering one final transcript per capture.
pub trait SpeechInput {
    /// Whether speech capture can run on this platform.
    fn is_available(&self) -> bool;

    /// Begin capturing; `on_result` receives the final transcript.
    fn start(&mut self, on_result: Box<dyn FnOnce(String) + Send>) -> Result<(), SpeechError>;

    /// Stop an in-progress capture.
    fn stop(&mut self);
}

/// Fallback implementation for platforms without a speech engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeechUnavailable;

impl SpeechInput for SpeechUnavailable {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self, _on_result: Box<dyn FnOnce(String) + Send>) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn stop(&mut self) {}
}
