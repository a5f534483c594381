//! Session note/tag state on top of a persistence gateway.
//!
//! # Responsibility
//! - Own the in-memory note and tag collections for one session.
//! - Apply gateway-acknowledged mutations to local state.
//!
//! # Invariants
//! - Local state changes only after the gateway call succeeds.
//! - `create` prepends; `update` replaces the whole entity by id.
//! - `reorder` is local-only and must be a permutation of current ids.
//! - Failures are logged and returned unchanged; local state is untouched.

use crate::gateway::{GatewayError, GatewayResult, PersistenceGateway};
use crate::model::note::{Note, NoteId, NoteInput, NotePatch};
use crate::model::tag::{Tag, TagInput, TagValidationError};
use crate::store::view::{filter_notes, NoteFilter};
use log::{error, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    Gateway(GatewayError),
    InvalidTag(TagValidationError),
    /// Reorder input is not a permutation of the current note ids.
    InvalidOrdering(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gateway(err) => write!(f, "{err}"),
            Self::InvalidTag(err) => write!(f, "{err}"),
            Self::InvalidOrdering(details) => write!(f, "invalid note ordering: {details}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Gateway(err) => Some(err),
            Self::InvalidTag(err) => Some(err),
            Self::InvalidOrdering(_) => None,
        }
    }
}

impl From<GatewayError> for StoreError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

impl From<TagValidationError> for StoreError {
    fn from(value: TagValidationError) -> Self {
        Self::InvalidTag(value)
    }
}

/// Authoritative note/tag list for the current session.
pub struct NoteStore<G: PersistenceGateway> {
    gateway: G,
    notes: Vec<Note>,
    tags: Vec<Tag>,
}

impl<G: PersistenceGateway> NoteStore<G> {
    /// Creates an empty store over the given gateway.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            notes: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Gateway this store writes through.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Mutable gateway access, e.g. to install a restored token.
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Consumes the store, handing the gateway back.
    pub fn into_gateway(self) -> G {
        self.gateway
    }

    /// Full note list in session order.
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    /// Tag list in gateway order, plus tags created this session.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Looks up a note in the local list.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Ids of the full list in session order; the input shape `reorder` expects.
    pub fn note_ids(&self) -> Vec<NoteId> {
        self.notes.iter().map(|note| note.id.clone()).collect()
    }

    /// Filtered, most-recent-first projection of the list.
    pub fn visible(&self, filter: &NoteFilter) -> Vec<&Note> {
        filter_notes(&self.notes, filter)
    }

    /// Replaces the local note list with the gateway's.
    pub fn fetch_notes(&mut self) -> StoreResult<usize> {
        let started_at = Instant::now();
        let notes = finish("notes_fetch", started_at, self.gateway.list_notes())?;
        self.notes = notes;
        info!(
            "event=notes_fetch module=store status=ok count={}",
            self.notes.len()
        );
        Ok(self.notes.len())
    }

    /// Replaces the local tag list with the gateway's.
    pub fn fetch_tags(&mut self) -> StoreResult<usize> {
        let started_at = Instant::now();
        let tags = finish("tags_fetch", started_at, self.gateway.list_tags())?;
        self.tags = tags;
        info!(
            "event=tags_fetch module=store status=ok count={}",
            self.tags.len()
        );
        Ok(self.tags.len())
    }

    /// Creates a note and prepends the gateway's entity.
    pub fn create(&mut self, input: NoteInput) -> StoreResult<Note> {
        let started_at = Instant::now();
        let note = finish("note_create", started_at, self.gateway.create_note(&input))?;
        self.notes.insert(0, note.clone());
        info!(
            "event=note_create module=store status=ok note_id={} count={}",
            note.id,
            self.notes.len()
        );
        Ok(note)
    }

    /// Sends a patch and replaces the local entry with the returned entity.
    pub fn update(&mut self, id: &str, patch: NotePatch) -> StoreResult<Note> {
        let started_at = Instant::now();
        let note = finish("note_update", started_at, self.gateway.update_note(id, &patch))?;
        match self.notes.iter_mut().find(|existing| existing.id == id) {
            Some(slot) => *slot = note.clone(),
            None => warn!("event=note_update module=store status=ok note_id={id} local=missing"),
        }
        info!("event=note_update module=store status=ok note_id={id}");
        Ok(note)
    }

    /// Deletes on the gateway, then drops the local entry.
    pub fn delete(&mut self, id: &str) -> StoreResult<()> {
        let started_at = Instant::now();
        finish("note_delete", started_at, self.gateway.delete_note(id))?;
        self.notes.retain(|note| note.id != id);
        info!(
            "event=note_delete module=store status=ok note_id={id} count={}",
            self.notes.len()
        );
        Ok(())
    }

    /// Applies a full replacement ordering locally.
    ///
    /// The order is not persisted and is lost on the next fetch.
    pub fn reorder(&mut self, order: &[NoteId]) -> StoreResult<()> {
        if order.len() != self.notes.len() {
            return Err(reject_ordering(format!(
                "expected {} ids, got {}",
                self.notes.len(),
                order.len()
            )));
        }

        let reordered = permute(&self.notes, order).map_err(reject_ordering)?;
        self.notes = reordered;
        info!(
            "event=notes_reorder module=store status=ok count={}",
            self.notes.len()
        );
        Ok(())
    }

    /// Validates and creates a tag, appending it to the local list.
    pub fn create_tag(&mut self, input: TagInput) -> StoreResult<Tag> {
        let input = input.validate().map_err(|err| {
            error!("event=tag_create module=store status=error error_code=invalid_tag error={err}");
            StoreError::from(err)
        })?;
        let started_at = Instant::now();
        let tag = finish("tag_create", started_at, self.gateway.create_tag(&input))?;
        self.tags.push(tag.clone());
        info!(
            "event=tag_create module=store status=ok tag_id={}",
            tag.id
        );
        Ok(tag)
    }

    /// Drops all session data.
    pub fn clear(&mut self) {
        self.notes.clear();
        self.tags.clear();
    }
}

fn finish<T>(
    operation: &'static str,
    started_at: Instant,
    result: GatewayResult<T>,
) -> StoreResult<T> {
    result.map_err(|err| {
        error!(
            "event={operation} module=store status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        );
        StoreError::Gateway(err)
    })
}

/// Arranges `notes` in `order`; every current id must appear exactly once.
fn permute(notes: &[Note], order: &[NoteId]) -> Result<Vec<Note>, String> {
    let mut by_id: HashMap<&str, &Note> = notes
        .iter()
        .map(|note| (note.id.as_str(), note))
        .collect();
    let mut reordered = Vec::with_capacity(order.len());
    for id in order {
        match by_id.remove(id.as_str()) {
            Some(note) => reordered.push(note.clone()),
            None => return Err(format!("id `{id}` is unknown or repeated")),
        }
    }
    Ok(reordered)
}

fn reject_ordering(details: String) -> StoreError {
    error!("event=notes_reorder module=store status=error error_code=invalid_ordering");
    StoreError::InvalidOrdering(details)
}

#[cfg(test)]
mod tests {
    use super::{NoteStore, StoreError};
    use crate::gateway::mock::MockGateway;
    use crate::model::note::{NoteInput, NotePatch};

    #[test]
    fn reorder_rejects_repeated_ids() {
        let mut store = NoteStore::new(MockGateway::seeded());
        store.fetch_notes().unwrap();
        let mut order = store.note_ids();
        order[1] = order[0].clone();
        let before = store.note_ids();

        let err = store.reorder(&order).unwrap_err();
        assert!(matches!(err, StoreError::InvalidOrdering(_)));
        assert_eq!(store.note_ids(), before);
    }

    #[test]
    fn update_replaces_entry_in_place() {
        let mut store = NoteStore::new(MockGateway::empty());
        let first = store.create(NoteInput::new("one", "")).unwrap();
        store.create(NoteInput::new("two", "")).unwrap();

        store.update(&first.id, NotePatch::title("uno")).unwrap();
        assert_eq!(store.list()[1].id, first.id);
        assert_eq!(store.list()[1].title, "uno");
    }
}
