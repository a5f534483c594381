//! Filter/sort projection over the session's note list.
//!
//! # Invariants
//! - Pure: never mutates its input; same inputs yield the same sequence.
//! - Output is sorted by `updated_at DESC`; ties keep input order.

use crate::model::note::Note;

/// Active sidebar selection and search box content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Selected tag id. `None` shows every tag.
    pub tag_id: Option<String>,
    /// Free-text query. Empty matches everything.
    pub query: String,
}

impl NoteFilter {
    /// Restricts the view to notes carrying `tag_id`.
    pub fn with_tag(mut self, tag_id: impl Into<String>) -> Self {
        self.tag_id = Some(tag_id.into());
        self
    }

    /// Sets the case-insensitive text query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Returns whether `note` passes both active constraints.
    pub fn matches(&self, note: &Note) -> bool {
        self.matches_lowered(note, &self.query.to_lowercase())
    }

    /// `matches` with the query already lowercased by the caller.
    fn matches_lowered(&self, note: &Note, needle: &str) -> bool {
        if let Some(tag_id) = self.tag_id.as_deref() {
            if !note.has_tag(tag_id) {
                return false;
            }
        }
        needle.is_empty() || note.matches_text(needle)
    }
}

/// Derives the displayed notes: tag filter, then text filter, then
/// most-recently-updated first.
pub fn filter_notes<'a>(notes: &'a [Note], filter: &NoteFilter) -> Vec<&'a Note> {
    let needle = filter.query.to_lowercase();
    let mut visible: Vec<&Note> = notes
        .iter()
        .filter(|note| filter.matches_lowered(note, &needle))
        .collect();

    visible.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    visible
}
