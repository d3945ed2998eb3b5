//! Local payload validation applied before any remote call.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::NoteDraft;

/// Maximum note content length, in characters.
pub const MAX_CONTENT_CHARS: usize = 10_000;
/// Maximum number of tags per note.
pub const MAX_TAGS: usize = 10;
const MIN_PASSWORD_CHARS: usize = 6;

/// A rejected payload, carrying every violated rule's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join("; "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl ValidationError {
    fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }
}

/// Validate a note draft against the content and tag bounds.
///
/// All violations are collected so the caller can report them together.
pub fn validate_draft(draft: &NoteDraft) -> Result<(), ValidationError> {
    let mut messages = Vec::new();

    if draft.content.trim().is_empty() {
        messages.push("Note content is required".to_string());
    }
    if draft.content.chars().count() > MAX_CONTENT_CHARS {
        messages.push("Note content is too long (max 10,000 characters)".to_string());
    }
    if draft.tags.len() > MAX_TAGS {
        messages.push("Maximum 10 tags allowed".to_string());
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { messages })
    }
}

/// Check an email address against the sign-up pattern.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = EMAIL_PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));
    pattern.is_match(email)
}

/// Validate sign-up/sign-in credentials.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if !validate_email(email) {
        return Err(ValidationError::single("Please enter a valid email address"));
    }
    validate_password(password)
}

/// Validate a password against the minimum length rule.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        Err(ValidationError::single(
            "Password must be at least 6 characters",
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn draft(content: &str, tags: &[&str]) -> NoteDraft {
        NoteDraft::new(content, tags.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn accepts_draft_within_bounds() {
        assert!(validate_draft(&draft("Buy milk", &["shopping"])).is_ok());
        assert!(validate_draft(&draft(&"x".repeat(MAX_CONTENT_CHARS), &[])).is_ok());
    }

    #[test]
    fn rejects_blank_content() {
        let error = validate_draft(&draft("  \n\t ", &[])).unwrap_err();
        assert_eq!(error.messages, vec!["Note content is required"]);
    }

    #[test]
    fn rejects_oversized_content() {
        let error = validate_draft(&draft(&"x".repeat(MAX_CONTENT_CHARS + 1), &[])).unwrap_err();
        assert_eq!(
            error.messages,
            vec!["Note content is too long (max 10,000 characters)"]
        );
    }

    #[test]
    fn rejects_too_many_tags() {
        let tags: Vec<&str> = vec!["t"; MAX_TAGS + 1];
        let error = validate_draft(&draft("ok", &tags)).unwrap_err();
        assert_eq!(error.messages, vec!["Maximum 10 tags allowed"]);
    }

    #[test]
    fn collects_every_violation() {
        let tags: Vec<&str> = vec!["t"; MAX_TAGS + 1];
        let error = validate_draft(&draft("", &tags)).unwrap_err();
        assert_eq!(error.messages.len(), 2);
    }

    #[test]
    fn duplicate_tags_are_not_deduplicated() {
        let duplicated = draft("ok", &["same", "same", "same"]);
        assert!(validate_draft(&duplicated).is_ok());
        assert_eq!(duplicated.tags.len(), 3);
    }

    #[test]
    fn validate_email_requires_domain() {
        assert!(validate_email("user@example.com"));
        assert!(!validate_email("bad@"));
        assert!(!validate_email("no-at-sign.com"));
        assert!(!validate_email("spaces in@example.com"));
    }

    #[test]
    fn validate_password_requires_six_characters() {
        let error = validate_password("abc12").unwrap_err();
        assert_eq!(
            error.messages,
            vec!["Password must be at least 6 characters"]
        );
        assert!(validate_password("abc123").is_ok());
    }
}
