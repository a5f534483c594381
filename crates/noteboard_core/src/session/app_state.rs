//! Application state for one client session.
//!
//! # Responsibility
//! - Own the note store, current user, theme and editor target.
//! - Tie session start/end to durable storage (token, user, theme).
//! - Gate note/tag mutations behind an authenticated session.
//!
//! # Invariants
//! - `is_authenticated()` implies `current_user().is_some()`.
//! - Logout clears notes, tags, editor and stored credentials; theme survives.
//! - Deleting the note open in the editor closes the editor.
//! - A failed restore during `init` leaves a logged-out session, never an error.

use crate::gateway::{GatewayError, PersistenceGateway};
use crate::model::note::{Note, NoteDraft, NoteId, NoteInput, NotePatch};
use crate::model::tag::{Tag, TagInput};
use crate::model::user::{ThemeMode, User, UserPatch};
use crate::session::storage::{SessionStorage, StorageError, KEY_THEME, KEY_TOKEN, KEY_USER};
use crate::store::note_store::{NoteStore, StoreError};
use crate::store::reorder::drop_ordering;
use crate::store::view::NoteFilter;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Token persisted when a gateway signs in without issuing one.
pub const DEMO_SESSION_TOKEN: &str = "demo_token";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Operation requires a signed-in user.
    NotAuthenticated,
    /// Editor asked to open a note absent from the session list.
    NoteNotFound(NoteId),
    Gateway(GatewayError),
    Store(StoreError),
    Storage(StorageError),
    Serialization(serde_json::Error),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "not signed in"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Gateway(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "stored session is invalid: {err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotAuthenticated | Self::NoteNotFound(_) => None,
            Self::Gateway(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// What the editor pane is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTarget {
    /// Unsaved draft; the first save creates a note.
    NewNote,
    Note(NoteId),
}

/// Explicit application state passed to views.
pub struct AppState<G: PersistenceGateway, S: SessionStorage> {
    store: NoteStore<G>,
    storage: S,
    user: Option<User>,
    theme: ThemeMode,
    editor: Option<EditorTarget>,
}

impl<G: PersistenceGateway, S: SessionStorage> AppState<G, S> {
    /// Starts a session, restoring theme and any stored sign-in.
    pub fn init(gateway: G, storage: S) -> Self {
        let mut state = Self {
            store: NoteStore::new(gateway),
            storage,
            user: None,
            theme: ThemeMode::default(),
            editor: None,
        };

        state.theme = match state.storage.get(KEY_THEME) {
            Ok(Some(value)) => ThemeMode::parse(&value).unwrap_or_default(),
            Ok(None) => ThemeMode::default(),
            Err(err) => {
                warn!("event=session_init module=session status=degraded reason=theme_read error={err}");
                ThemeMode::default()
            }
        };

        match state.restore() {
            Ok(true) => info!(
                "event=session_init module=session status=ok restored=true backend={}",
                state.store.gateway().name()
            ),
            Ok(false) => info!("event=session_init module=session status=ok restored=false"),
            Err(err) => {
                error!("event=session_init module=session status=error error={err}");
                state.logout();
            }
        }
        state
    }

    /// Ends the session without signing out; stored credentials survive.
    pub fn teardown(mut self) -> (G, S) {
        self.user = None;
        self.editor = None;
        self.store.clear();
        info!("event=session_teardown module=session status=ok");
        (self.store.into_gateway(), self.storage)
    }

    fn restore(&mut self) -> AppResult<bool> {
        let token = self.storage.get(KEY_TOKEN)?;
        let stored_user = self.storage.get(KEY_USER)?;
        let (Some(token), Some(stored_user)) = (token, stored_user) else {
            return Ok(false);
        };

        let user: User = serde_json::from_str(&stored_user)?;
        self.store.gateway_mut().set_auth_token(Some(token));
        self.user = Some(user);
        self.refresh()?;
        Ok(true)
    }

    /// Returns whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Signed-in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Active color scheme.
    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    /// Read access to the session's notes and tags.
    pub fn store(&self) -> &NoteStore<G> {
        &self.store
    }

    /// Durable session storage backing this state.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// What the editor pane shows, or `None` when it is closed.
    pub fn editor(&self) -> Option<&EditorTarget> {
        self.editor.as_ref()
    }

    /// Signs in, persists the session and loads notes and tags.
    pub fn login(&mut self, username: &str, password: &str) -> AppResult<&User> {
        let user = self.store.gateway_mut().login(username, password).map_err(|err| {
            error!("event=auth_login module=session status=error error={err}");
            err
        })?;
        self.begin_session(user)?;
        self.refresh()?;
        info!("event=auth_login module=session status=ok notes={}", self.store.list().len());
        self.current_user().ok_or(AppError::NotAuthenticated)
    }

    /// Creates an account and starts an empty session.
    pub fn register(&mut self, username: &str, email: &str, password: &str) -> AppResult<&User> {
        let user = self
            .store
            .gateway_mut()
            .register(username, email, password)
            .map_err(|err| {
                error!("event=auth_register module=session status=error error={err}");
                err
            })?;
        self.begin_session(user)?;
        self.store.clear();
        info!("event=auth_register module=session status=ok");
        self.current_user().ok_or(AppError::NotAuthenticated)
    }

    fn begin_session(&mut self, user: User) -> AppResult<()> {
        let token = self
            .store
            .gateway()
            .auth_token()
            .unwrap_or_else(|| DEMO_SESSION_TOKEN.to_string());
        let serialized = serde_json::to_string(&user)?;
        self.storage.set(KEY_TOKEN, &token)?;
        self.storage.set(KEY_USER, &serialized)?;
        self.store.gateway_mut().set_auth_token(Some(token));
        self.user = Some(user);
        self.editor = None;
        Ok(())
    }

    /// Signs out: clears session data and stored credentials.
    ///
    /// Storage failures are logged; the in-memory session is cleared regardless.
    pub fn logout(&mut self) {
        self.user = None;
        self.editor = None;
        self.store.clear();
        self.store.gateway_mut().set_auth_token(None);
        for key in [KEY_TOKEN, KEY_USER] {
            if let Err(err) = self.storage.remove(key) {
                warn!("event=auth_logout module=session status=degraded key={key} error={err}");
            }
        }
        info!("event=auth_logout module=session status=ok");
    }

    /// Flips and persists the theme.
    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.theme = self.theme.toggled();
        if let Err(err) = self.storage.set(KEY_THEME, self.theme.as_str()) {
            warn!("event=theme_toggle module=session status=degraded error={err}");
        }
        self.theme
    }

    /// Updates the profile and persists the returned user.
    pub fn update_user(&mut self, patch: &UserPatch) -> AppResult<&User> {
        self.require_auth()?;
        let user = self.store.gateway_mut().update_user(patch).map_err(|err| {
            error!("event=user_update module=session status=error error={err}");
            err
        })?;
        self.storage.set(KEY_USER, &serde_json::to_string(&user)?)?;
        self.user = Some(user);
        self.current_user().ok_or(AppError::NotAuthenticated)
    }

    /// Refetches notes and tags from the gateway.
    pub fn refresh(&mut self) -> AppResult<()> {
        self.require_auth()?;
        self.store.fetch_notes()?;
        self.store.fetch_tags()?;
        Ok(())
    }

    /// Filtered, most-recent-first view of the session's notes.
    pub fn visible_notes(&self, filter: &NoteFilter) -> Vec<&Note> {
        self.store.visible(filter)
    }

    /// Creates a note; it appears first in the session list.
    pub fn create_note(&mut self, input: NoteInput) -> AppResult<Note> {
        self.require_auth()?;
        Ok(self.store.create(input)?)
    }

    /// Patches a note and replaces the local copy with the gateway's result.
    pub fn update_note(&mut self, id: &str, patch: NotePatch) -> AppResult<Note> {
        self.require_auth()?;
        Ok(self.store.update(id, patch)?)
    }

    /// Deletes a note, closing the editor if it targets that note.
    pub fn delete_note(&mut self, id: &str) -> AppResult<()> {
        self.require_auth()?;
        self.store.delete(id)?;
        if matches!(self.editor.as_ref(), Some(EditorTarget::Note(open)) if open == id) {
            self.editor = None;
        }
        Ok(())
    }

    /// Applies a full replacement ordering to the session list.
    pub fn reorder_notes(&mut self, order: &[NoteId]) -> AppResult<()> {
        self.require_auth()?;
        Ok(self.store.reorder(order)?)
    }

    /// Commits a finished drag of `active_id` dropped onto `over_id`.
    ///
    /// The move is computed over the full session list, so it works the same
    /// whether or not the view is filtered. Returns `false` when nothing moved:
    /// dropped on itself, outside any card, or onto an id not in the list.
    pub fn drop_note(&mut self, active_id: &str, over_id: Option<&str>) -> AppResult<bool> {
        self.require_auth()?;
        let Some(order) = drop_ordering(active_id, over_id, &self.store.note_ids()) else {
            return Ok(false);
        };
        self.store.reorder(&order)?;
        Ok(true)
    }

    /// Validates and creates a tag.
    pub fn create_tag(&mut self, input: TagInput) -> AppResult<Tag> {
        self.require_auth()?;
        Ok(self.store.create_tag(input)?)
    }

    /// Opens an empty draft.
    pub fn open_new_note(&mut self) -> NoteDraft {
        self.editor = Some(EditorTarget::NewNote);
        NoteDraft::default()
    }

    /// Opens an existing note from the session list.
    pub fn open_note(&mut self, id: &str) -> AppResult<NoteDraft> {
        let note = self
            .store
            .get(id)
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))?;
        let draft = NoteDraft::from(note);
        self.editor = Some(EditorTarget::Note(note.id.clone()));
        Ok(draft)
    }

    /// Closes the editor without saving.
    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Saves a draft: creates when it has no id, updates otherwise.
    ///
    /// After a create the editor targets the new note.
    pub fn save_editor(&mut self, draft: &NoteDraft) -> AppResult<Note> {
        match draft.id.as_deref() {
            Some(id) => self.update_note(id, draft.to_patch()),
            None => {
                let note = self.create_note(draft.to_input())?;
                self.editor = Some(EditorTarget::Note(note.id.clone()));
                Ok(note)
            }
        }
    }

    fn require_auth(&self) -> AppResult<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AppError::NotAuthenticated)
        }
    }
}
