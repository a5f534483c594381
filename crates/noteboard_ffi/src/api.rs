//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the single process-wide session and route every call through it.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Calls made before `session_start` fail with a message, never a panic.
//! - Return values are UTF-8 strings with stable meaning.

use noteboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppState, BackendGateway, ClientConfig, ConfigError, MemorySessionStorage, Note, NoteDraft,
    NoteFilter, SessionStorage, SqliteSessionStorage, Tag, TagInput,
};
use log::warn;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

type Session = AppState<BackendGateway, Box<dyn SessionStorage + Send>>;

static SESSION: Lazy<Mutex<Option<Session>>> = Lazy::new(|| Mutex::new(None));

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive); blank
///   falls back to `NOTEBOARD_LOG_LEVEL`, then the build default.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = match effective_log_level(&level) {
        Ok(level) => level,
        Err(err) => return err.to_string(),
    };
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

fn effective_log_level(requested: &str) -> Result<String, ConfigError> {
    let requested = requested.trim();
    if !requested.is_empty() {
        return Ok(requested.to_string());
    }
    Ok(ClientConfig::from_env()?.log_level)
}

/// Session snapshot returned by lifecycle and auth calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    pub authenticated: bool,
    pub username: Option<String>,
    /// `light|dark`.
    pub theme: String,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl SessionResponse {
    fn snapshot(session: &Session, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            authenticated: session.is_authenticated(),
            username: session.current_user().map(|user| user.username.clone()),
            theme: session.theme().as_str().to_string(),
            message: message.into(),
        }
    }

    /// Snapshot after `operation` ran; a failure still reports the real session.
    fn settled(session: &Session, operation: &str, outcome: Result<&str, String>) -> Self {
        match outcome {
            Ok(message) => Self::snapshot(session, message),
            Err(err) => Self {
                ok: false,
                ..Self::snapshot(session, format!("{operation} failed: {err}"))
            },
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            authenticated: false,
            username: None,
            theme: String::new(),
            message: message.into(),
        }
    }
}

/// Note projection for list and editor views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl From<&Note> for NoteItem {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
            created_at_ms: note.created_at.timestamp_millis(),
            updated_at_ms: note.updated_at.timestamp_millis(),
        }
    }
}

/// Visible-notes response for the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesResponse {
    pub items: Vec<NoteItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagItem {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl From<&Tag> for TagItem {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id.clone(),
            name: tag.name.clone(),
            color: tag.color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsResponse {
    pub items: Vec<TagItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// ID of the created or changed entity, when there is one.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Starts the process session, restoring any stored sign-in.
///
/// `data_dir` overrides `NOTEBOARD_DATA_DIR`; with neither set, session state
/// lives in memory only. Starting again replaces the current session.
///
/// # FFI contract
/// - Sync call; mock backend is local, HTTP backend performs network I/O on restore.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn session_start(data_dir: Option<String>) -> SessionResponse {
    let mut config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => return SessionResponse::failure(format!("session_start failed: {err}")),
    };
    if let Some(dir) = data_dir.map(|dir| dir.trim().to_string()) {
        if !dir.is_empty() {
            config.data_dir = Some(PathBuf::from(dir));
        }
    }

    let gateway = match BackendGateway::from_config(&config) {
        Ok(gateway) => gateway,
        Err(err) => return SessionResponse::failure(format!("session_start failed: {err}")),
    };
    let storage: Box<dyn SessionStorage + Send> = match config.session_db_path() {
        Some(path) => match SqliteSessionStorage::open(&path) {
            Ok(storage) => Box::new(storage),
            Err(err) => return SessionResponse::failure(format!("session_start failed: {err}")),
        },
        None => Box::new(MemorySessionStorage::new()),
    };

    let session = AppState::init(gateway, storage);
    let response = SessionResponse::snapshot(&session, "Session started.");
    *lock_session() = Some(session);
    response
}

/// Ends the process session. Stored credentials stay for the next start.
#[flutter_rust_bridge::frb(sync)]
pub fn session_end() -> ActionResponse {
    match lock_session().take() {
        Some(session) => {
            drop(session.teardown());
            ActionResponse::success("Session ended.", None)
        }
        None => ActionResponse::failure("session_end failed: no active session"),
    }
}

/// Returns the current session snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn session_state() -> SessionResponse {
    session_call("session_state", |_| Ok("ok"))
}

/// Signs in and loads notes and tags.
///
/// A failure after the gateway accepted the credentials (e.g. the first fetch)
/// reports `ok == false` with `authenticated == true`.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_login(username: String, password: String) -> SessionResponse {
    session_call("auth_login", |session| {
        session
            .login(username.trim(), &password)
            .map_err(|err| err.to_string())?;
        Ok("Signed in.")
    })
}

/// Creates an account and signs in with empty lists.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_register(username: String, email: String, password: String) -> SessionResponse {
    session_call("auth_register", |session| {
        session
            .register(username.trim(), email.trim(), &password)
            .map_err(|err| err.to_string())?;
        Ok("Account created.")
    })
}

/// Signs out and forgets stored credentials; the theme is kept.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_logout() -> SessionResponse {
    session_call("auth_logout", |session| {
        session.logout();
        Ok("Signed out.")
    })
}

/// Flips the theme and returns the new mode (`light|dark`), or empty string
/// when no session is active.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_toggle() -> String {
    with_session(|session| Ok(session.toggle_theme().as_str().to_string())).unwrap_or_default()
}

/// Lists visible notes: optional tag filter, case-insensitive text query,
/// most recently updated first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(tag_id: Option<String>, query: String) -> NotesResponse {
    let mut filter = NoteFilter::default().with_query(query);
    if let Some(tag_id) = tag_id.filter(|tag_id| !tag_id.trim().is_empty()) {
        filter = filter.with_tag(tag_id);
    }

    match with_session(|session| {
        Ok(session
            .visible_notes(&filter)
            .into_iter()
            .map(NoteItem::from)
            .collect::<Vec<_>>())
    }) {
        Ok(items) => {
            let message = if items.is_empty() {
                "No notes.".to_string()
            } else {
                format!("Found {} note(s).", items.len())
            };
            NotesResponse { items, message }
        }
        Err(err) => NotesResponse {
            items: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Refetches notes and tags, discarding any local ordering.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_refresh() -> ActionResponse {
    match with_session(|session| session.refresh().map_err(|err| err.to_string())) {
        Ok(()) => ActionResponse::success("Notes refreshed.", None),
        Err(err) => ActionResponse::failure(format!("notes_refresh failed: {err}")),
    }
}

/// Saves editor content: creates when `id` is absent, updates otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn note_save(
    id: Option<String>,
    title: String,
    content: String,
    tags: Vec<String>,
) -> ActionResponse {
    let draft = NoteDraft {
        id: id.filter(|id| !id.trim().is_empty()),
        title,
        content,
        tags,
    };
    let created = draft.id.is_none();

    match with_session(|session| session.save_editor(&draft).map_err(|err| err.to_string())) {
        Ok(note) if created => ActionResponse::success("Note created.", Some(note.id)),
        Ok(note) => ActionResponse::success("Note updated.", Some(note.id)),
        Err(err) => ActionResponse::failure(format!("note_save failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> ActionResponse {
    match with_session(|session| session.delete_note(&id).map_err(|err| err.to_string())) {
        Ok(()) => ActionResponse::success("Note deleted.", Some(id)),
        Err(err) => ActionResponse::failure(format!("note_delete failed: {err}")),
    }
}

/// Full session ordering of note ids, unfiltered. This is the sequence
/// `notes_reorder` expects a permutation of.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_order() -> Vec<String> {
    with_session(|session| Ok(session.store().note_ids())).unwrap_or_default()
}

/// Commits a finished drag of card `active_id` dropped on card `over_id`.
///
/// Works from any view, filtered or not: the move is applied to the full
/// session list. Dropping outside any card (`None`) or on the origin card
/// succeeds without changing anything.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_drag_end(active_id: String, over_id: Option<String>) -> ActionResponse {
    match with_session(|session| {
        session
            .drop_note(&active_id, over_id.as_deref())
            .map_err(|err| err.to_string())
    }) {
        Ok(true) => ActionResponse::success("Notes reordered.", Some(active_id)),
        Ok(false) => ActionResponse::success("Nothing moved.", None),
        Err(err) => ActionResponse::failure(format!("notes_drag_end failed: {err}")),
    }
}

/// Applies a drag result: `ordered_ids` must be a permutation of the session's notes.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_reorder(ordered_ids: Vec<String>) -> ActionResponse {
    match with_session(|session| {
        session
            .reorder_notes(&ordered_ids)
            .map_err(|err| err.to_string())
    }) {
        Ok(()) => ActionResponse::success("Notes reordered.", None),
        Err(err) => ActionResponse::failure(format!("notes_reorder failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn tags_list() -> TagsResponse {
    match with_session(|session| {
        Ok(session
            .store()
            .tags()
            .iter()
            .map(TagItem::from)
            .collect::<Vec<_>>())
    }) {
        Ok(items) => TagsResponse {
            message: format!("Found {} tag(s).", items.len()),
            items,
        },
        Err(err) => TagsResponse {
            items: Vec::new(),
            message: format!("tags_list failed: {err}"),
        },
    }
}

/// Creates a tag. `color` must be `#rgb` or `#rrggbb`.
#[flutter_rust_bridge::frb(sync)]
pub fn tag_create(name: String, color: String) -> ActionResponse {
    let input = TagInput::new(name, color);
    match with_session(|session| session.create_tag(input).map_err(|err| err.to_string())) {
        Ok(tag) => ActionResponse::success("Tag created.", Some(tag.id)),
        Err(err) => ActionResponse::failure(format!("tag_create failed: {err}")),
    }
}

fn lock_session() -> MutexGuard<'static, Option<Session>> {
    SESSION.lock().unwrap_or_else(|poisoned| {
        warn!("event=session_lock module=ffi status=degraded reason=poisoned");
        poisoned.into_inner()
    })
}

fn session_call(
    operation: &str,
    f: impl FnOnce(&mut Session) -> Result<&'static str, String>,
) -> SessionResponse {
    let mut guard = lock_session();
    match guard.as_mut() {
        Some(session) => {
            let outcome = f(session);
            SessionResponse::settled(session, operation, outcome)
        }
        None => SessionResponse::failure(format!("{operation} failed: no active session")),
    }
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> Result<T, String>) -> Result<T, String> {
    let mut guard = lock_session();
    match guard.as_mut() {
        Some(session) => f(session),
        None => Err("no active session".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        auth_login, auth_logout, core_version, effective_log_level, init_logging, note_delete,
        note_save, notes_drag_end, notes_list, notes_order, notes_reorder, ping, session_end,
        session_start, session_state, tag_create, tags_list, theme_toggle, Session,
        SessionResponse,
    };
    use noteboard_core::{
        AppState, BackendGateway, ClientConfig, MemorySessionStorage, MockGateway, SessionStorage,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn blank_log_level_falls_back_to_configured_level() {
        let configured = ClientConfig::from_env().unwrap().log_level;
        assert_eq!(effective_log_level("   ").unwrap(), configured);
        assert_eq!(effective_log_level(" warn ").unwrap(), "warn");

        let error = init_logging(String::new(), String::new());
        assert!(error.contains("log_dir"), "{error}");
    }

    #[test]
    fn failed_call_reports_the_live_session_state() {
        let storage: Box<dyn SessionStorage + Send> = Box::new(MemorySessionStorage::new());
        let mut session: Session =
            AppState::init(BackendGateway::Mock(MockGateway::seeded()), storage);
        session.login("testuser", "secret").unwrap();

        let response =
            SessionResponse::settled(&session, "auth_login", Err("fetch failed".to_string()));
        assert!(!response.ok);
        assert!(response.authenticated);
        assert_eq!(response.username.as_deref(), Some("testuser"));
        assert_eq!(response.message, "auth_login failed: fetch failed");
    }

    // The session is process-global, so the whole flow runs in one test.
    #[test]
    fn session_flow_against_mock_backend() {
        let started = session_start(None);
        assert!(started.ok, "{}", started.message);
        assert!(!started.authenticated);

        let denied = note_save(None, "t".to_string(), "c".to_string(), Vec::new());
        assert!(!denied.ok);

        let signed_in = auth_login("testuser".to_string(), "secret".to_string());
        assert!(signed_in.ok, "{}", signed_in.message);
        assert_eq!(signed_in.username.as_deref(), Some("testuser"));

        let filtered: Vec<String> = notes_list(Some("1".to_string()), String::new())
            .items
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(filtered, vec!["5", "1"]);
        let dragged = notes_drag_end("5".to_string(), Some("1".to_string()));
        assert!(dragged.ok, "{}", dragged.message);
        assert_eq!(notes_order(), vec!["5", "1", "2", "3", "4"]);
        let unchanged = notes_drag_end("5".to_string(), None);
        assert!(unchanged.ok);
        assert_eq!(unchanged.id, None);
        assert_eq!(notes_order(), vec!["5", "1", "2", "3", "4"]);

        let created = note_save(
            None,
            "Zebra".to_string(),
            "stripes".to_string(),
            vec!["1".to_string()],
        );
        assert!(created.ok, "{}", created.message);
        let created_id = created.id.expect("create should return id");

        let found = notes_list(Some("1".to_string()), "ZEBRA".to_string());
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].id, created_id);

        let mut ids: Vec<String> = notes_list(None, String::new())
            .items
            .into_iter()
            .map(|item| item.id)
            .collect();
        ids.reverse();
        assert!(notes_reorder(ids.clone()).ok);
        ids.pop();
        assert!(!notes_reorder(ids).ok);

        assert!(!tag_create("Bad".to_string(), "blue".to_string()).ok);
        assert!(tag_create("Travel".to_string(), "#14B8A6".to_string()).ok);
        assert!(tags_list().items.iter().any(|tag| tag.name == "Travel"));

        assert!(note_delete(created_id.clone()).ok);
        assert!(!note_delete(created_id).ok);

        let theme = theme_toggle();
        assert_eq!(theme, "dark");
        let signed_out = auth_logout();
        assert!(!signed_out.authenticated);
        assert_eq!(signed_out.theme, "dark");

        assert!(session_end().ok);
        assert!(!session_state().ok);
        assert!(!session_end().ok);
        assert!(notes_list(None, String::new()).items.is_empty());
        assert!(notes_order().is_empty());
        assert!(!notes_drag_end("1".to_string(), Some("2".to_string())).ok);
    }
}
