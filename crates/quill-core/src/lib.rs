//! quill-core - Core library for Quill
//!
//! This crate contains the shared models, the remote store client, and the
//! note-management flow used by Quill front ends.

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod models;
pub mod notify;
pub mod session;
pub mod speech;
pub mod util;
pub mod validate;

pub use error::{Error, Result};
pub use models::{Note, NoteDraft, NoteId};
