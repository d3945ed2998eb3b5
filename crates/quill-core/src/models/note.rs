//! Note model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for a note, assigned by the remote store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Create a fresh random ID (test doubles standing in for the store).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A note held by the remote store.
///
/// All fields besides the submitted `content`/`tags` are populated by the
/// store: `id` is immutable once assigned, `title` is derived from the
/// content server-side, and the timestamps are stamped on create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Display title derived by the remote store.
    #[serde(default)]
    pub title: String,
    /// Plain text content.
    pub content: String,
    /// Ordered tags as submitted; duplicates are preserved.
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload submitted to the store on create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NoteDraft {
    #[must_use]
    pub fn new(content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            content: content.into(),
            tags,
        }
    }
}
