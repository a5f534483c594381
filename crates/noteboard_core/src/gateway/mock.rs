//! In-memory gateway for demos and tests.
//!
//! # Responsibility
//! - Serve the full gateway contract without any backend.
//! - Seed a demo account, tags and notes on request.
//!
//! # Invariants
//! - Created notes get a v4 UUID and `created_at == updated_at`.
//! - Updates merge the patch and bump `updated_at` to now.
//! - New notes are kept at the front of the backing list.

use super::{GatewayError, GatewayResult, PersistenceGateway};
use crate::model::note::{Note, NoteInput, NotePatch};
use crate::model::tag::{Tag, TagInput};
use crate::model::user::{User, UserPatch};
use chrono::{Duration, Utc};
use log::debug;
use uuid::Uuid;

/// Token issued by the mock for every successful sign-in.
pub const MOCK_AUTH_TOKEN: &str = "demo_token";

/// Gateway backed by plain vectors.
#[derive(Debug, Clone)]
pub struct MockGateway {
    user: User,
    notes: Vec<Note>,
    tags: Vec<Tag>,
    token: Option<String>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::empty()
    }
}

impl MockGateway {
    /// Creates a gateway with the demo user and no notes or tags.
    pub fn empty() -> Self {
        Self {
            user: demo_user(),
            notes: Vec::new(),
            tags: Vec::new(),
            token: None,
        }
    }

    /// Creates a gateway seeded with demo tags and notes.
    pub fn seeded() -> Self {
        Self {
            user: demo_user(),
            notes: demo_notes(),
            tags: demo_tags(),
            token: None,
        }
    }

    /// Creates a gateway holding exactly the given data.
    pub fn with_data(notes: Vec<Note>, tags: Vec<Tag>) -> Self {
        Self {
            user: demo_user(),
            notes,
            tags,
            token: None,
        }
    }

    /// Backing note list, in storage order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn position(&self, id: &str) -> GatewayResult<usize> {
        self.notes
            .iter()
            .position(|note| note.id == id)
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }
}

impl PersistenceGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn login(&mut self, _username: &str, _password: &str) -> GatewayResult<User> {
        self.token = Some(MOCK_AUTH_TOKEN.to_string());
        Ok(self.user.clone())
    }

    fn register(&mut self, username: &str, email: &str, _password: &str) -> GatewayResult<User> {
        self.token = Some(MOCK_AUTH_TOKEN.to_string());
        Ok(User {
            username: username.to_string(),
            email: email.to_string(),
            ..self.user.clone()
        })
    }

    fn list_notes(&mut self) -> GatewayResult<Vec<Note>> {
        Ok(self.notes.clone())
    }

    fn get_note(&mut self, id: &str) -> GatewayResult<Note> {
        let index = self.position(id)?;
        Ok(self.notes[index].clone())
    }

    fn create_note(&mut self, input: &NoteInput) -> GatewayResult<Note> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title: input.title.clone(),
            content: input.content.clone(),
            tags: input.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        self.notes.insert(0, note.clone());
        debug!("event=mock_create_note module=gateway note_id={}", note.id);
        Ok(note)
    }

    fn update_note(&mut self, id: &str, patch: &NotePatch) -> GatewayResult<Note> {
        let index = self.position(id)?;
        let note = &mut self.notes[index];
        note.apply_patch(patch);
        // Clock skew must never push updated_at below created_at.
        note.updated_at = Utc::now().max(note.created_at);
        Ok(note.clone())
    }

    fn delete_note(&mut self, id: &str) -> GatewayResult<()> {
        let index = self.position(id)?;
        self.notes.remove(index);
        Ok(())
    }

    fn list_tags(&mut self) -> GatewayResult<Vec<Tag>> {
        Ok(self.tags.clone())
    }

    fn create_tag(&mut self, input: &TagInput) -> GatewayResult<Tag> {
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name: input.name.clone(),
            color: input.color.clone(),
        };
        self.tags.push(tag.clone());
        Ok(tag)
    }

    fn update_user(&mut self, patch: &UserPatch) -> GatewayResult<User> {
        if let Some(username) = patch.username.as_ref() {
            self.user.username = username.clone();
        }
        if let Some(email) = patch.email.as_ref() {
            self.user.email = email.clone();
        }
        Ok(self.user.clone())
    }

    fn auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn set_auth_token(&mut self, token: Option<String>) {
        self.token = token;
    }
}

fn demo_user() -> User {
    User {
        id: "1".to_string(),
        username: "testuser".to_string(),
        email: "test@example.com".to_string(),
    }
}

fn demo_tags() -> Vec<Tag> {
    [
        ("1", "Work", "#3B82F6"),
        ("2", "Personal", "#10B981"),
        ("3", "Ideas", "#8B5CF6"),
        ("4", "Important", "#EF4444"),
    ]
    .into_iter()
    .map(|(id, name, color)| Tag {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
    })
    .collect()
}

fn demo_notes() -> Vec<Note> {
    let now = Utc::now();
    let days_ago = |days: i64| now - Duration::days(days);
    let note = |id: &str, title: &str, content: &str, tags: &[&str], created: i64, updated: i64| {
        Note {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            created_at: days_ago(created),
            updated_at: days_ago(updated),
        }
    };

    vec![
        note(
            "1",
            "Project Meeting Notes",
            "Discussed the new features for the upcoming release. Need to follow up with the design team about the UI mockups.",
            &["1", "4"],
            7,
            2,
        ),
        note(
            "2",
            "Shopping List",
            "- Milk\n- Eggs\n- Bread\n- Fruits\n- Vegetables",
            &["2"],
            5,
            5,
        ),
        note(
            "3",
            "App Idea: Fitness Tracker",
            "Create a fitness tracking app that uses AI to suggest personalized workout routines based on user preferences and history.",
            &["3"],
            3,
            1,
        ),
        note(
            "4",
            "Book Recommendations",
            "1. \"Atomic Habits\" by James Clear\n2. \"The Psychology of Money\" by Morgan Housel\n3. \"Deep Work\" by Cal Newport",
            &["2", "3"],
            10,
            10,
        ),
        note(
            "5",
            "Weekly Goals",
            "- Complete project documentation\n- Prepare presentation for client meeting\n- Review pull requests\n- Set up new development environment",
            &["1", "4"],
            2,
            1,
        ),
    ]
}
