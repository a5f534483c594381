//! Note domain model.
//!
//! # Responsibility
//! - Define the note record exchanged with persistence gateways.
//! - Define create/patch request shapes that never carry server-owned fields.
//!
//! # Invariants
//! - `id`, `created_at` and `updated_at` are assigned by the gateway only.
//! - `updated_at >= created_at` for every gateway-issued note.
//! - `tags` holds tag ids in insertion order; duplicates carry no meaning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque note identifier issued by the gateway.
pub type NoteId = String;

/// Full note entity as returned by a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Tag ids attached to this note.
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Returns whether the note carries the given tag id.
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|tag| tag == tag_id)
    }

    /// Case-insensitive substring match over title and content.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.content.to_lowercase().contains(needle_lower)
    }

    /// Applies a partial patch in place. Timestamps are left untouched.
    pub fn apply_patch(&mut self, patch: &NotePatch) {
        if let Some(title) = patch.title.as_ref() {
            self.title = title.clone();
        }
        if let Some(content) = patch.content.as_ref() {
            self.content = content.clone();
        }
        if let Some(tags) = patch.tags.as_ref() {
            self.tags = tags.clone();
        }
    }
}

/// Create request: a note without id or timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NoteInput {
    /// Untagged input.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    /// Replaces the tag id list.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Partial update request. Absent fields are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    /// Patch that only renames.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Returns whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

/// Editor-side draft: a note that may or may not exist yet.
///
/// `id == None` means the draft has never been saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub id: Option<NoteId>,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NoteDraft {
    /// Drafts are worth saving once either text field is non-empty.
    pub fn has_text(&self) -> bool {
        !self.title.is_empty() || !self.content.is_empty()
    }

    /// Create request carrying the draft's fields.
    pub fn to_input(&self) -> NoteInput {
        NoteInput {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Patch setting every editable field to the draft's value.
    pub fn to_patch(&self) -> NotePatch {
        NotePatch {
            title: Some(self.title.clone()),
            content: Some(self.content.clone()),
            tags: Some(self.tags.clone()),
        }
    }
}

impl From<&Note> for NoteDraft {
    fn from(note: &Note) -> Self {
        Self {
            id: Some(note.id.clone()),
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NotePatch};
    use chrono::Utc;

    fn sample() -> Note {
        let now = Utc::now();
        Note {
            id: "n1".to_string(),
            title: "Weekly Goals".to_string(),
            content: "Review pull requests".to_string(),
            tags: vec!["1".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn matches_text_is_case_insensitive_over_title_and_content() {
        let note = sample();
        assert!(note.matches_text("weekly"));
        assert!(note.matches_text("pull"));
        assert!(!note.matches_text("groceries"));
    }

    #[test]
    fn patch_serialization_omits_absent_fields() {
        let json = serde_json::to_value(NotePatch::title("X")).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "X" }));
    }

    #[test]
    fn note_uses_camel_case_timestamps_on_the_wire() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
