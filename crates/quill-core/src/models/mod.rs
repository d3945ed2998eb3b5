//! Data models shared across the client.

mod note;

pub use note::{Note, NoteDraft, NoteId};
