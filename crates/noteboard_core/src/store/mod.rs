//! Session note state, derived views and drag reordering.
//!
//! # Responsibility
//! - Keep the session's note/tag cache in step with gateway acknowledgements.
//! - Derive the displayed list without mutating the cache.
//! - Translate drag gestures into local reorders.

pub mod note_store;
pub mod reorder;
pub mod view;
