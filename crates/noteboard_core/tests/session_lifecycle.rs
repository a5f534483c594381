use noteboard_core::session::app_state::DEMO_SESSION_TOKEN;
use noteboard_core::session::storage::{KEY_THEME, KEY_TOKEN, KEY_USER};
use noteboard_core::{
    AppError, AppState, EditorTarget, MemorySessionStorage, MockGateway, NoteFilter, NoteInput,
    PersistenceGateway, SessionStorage, SqliteSessionStorage, ThemeMode, UserPatch,
};

type MockApp = AppState<MockGateway, MemorySessionStorage>;

fn signed_in() -> MockApp {
    let mut app = AppState::init(MockGateway::seeded(), MemorySessionStorage::new());
    app.login("testuser", "secret").unwrap();
    app
}

#[test]
fn fresh_session_is_signed_out_with_light_theme() {
    let app = AppState::init(MockGateway::seeded(), MemorySessionStorage::new());
    assert!(!app.is_authenticated());
    assert_eq!(app.theme(), ThemeMode::Light);
    assert!(app.store().list().is_empty());
}

#[test]
fn login_persists_credentials_and_loads_data() {
    let app = signed_in();
    assert!(app.is_authenticated());
    assert_eq!(app.store().list().len(), 5);
    assert_eq!(app.store().tags().len(), 4);
    assert_eq!(
        app.storage().get(KEY_TOKEN).unwrap().as_deref(),
        Some(DEMO_SESSION_TOKEN)
    );
    let stored_user = app.storage().get(KEY_USER).unwrap().unwrap();
    assert!(stored_user.contains("testuser"));
}

#[test]
fn register_starts_with_empty_lists() {
    let mut app = AppState::init(MockGateway::seeded(), MemorySessionStorage::new());
    let user = app.register("ana", "ana@example.com", "pw").unwrap();
    assert_eq!(user.username, "ana");
    assert!(app.store().list().is_empty());
    assert!(app.store().tags().is_empty());
}

#[test]
fn teardown_then_init_restores_session_from_storage() {
    let mut app = signed_in();
    app.toggle_theme();
    let (gateway, storage) = app.teardown();

    let restored = AppState::init(gateway, storage);
    assert!(restored.is_authenticated());
    assert_eq!(restored.current_user().unwrap().username, "testuser");
    assert_eq!(restored.theme(), ThemeMode::Dark);
    assert_eq!(restored.store().list().len(), 5);
}

#[test]
fn corrupt_stored_user_falls_back_to_signed_out_session() {
    let mut storage = MemorySessionStorage::new();
    storage.set(KEY_TOKEN, "demo_token").unwrap();
    storage.set(KEY_USER, "{not json").unwrap();

    let app = AppState::init(MockGateway::seeded(), storage);
    assert!(!app.is_authenticated());
    assert_eq!(app.storage().get(KEY_TOKEN).unwrap(), None);
    assert_eq!(app.storage().get(KEY_USER).unwrap(), None);
}

#[test]
fn logout_clears_session_but_keeps_theme() {
    let mut app = signed_in();
    app.toggle_theme();
    app.logout();

    assert!(!app.is_authenticated());
    assert!(app.store().list().is_empty());
    assert!(app.store().gateway().auth_token().is_none());
    assert_eq!(app.storage().get(KEY_TOKEN).unwrap(), None);
    assert_eq!(app.storage().get(KEY_THEME).unwrap().as_deref(), Some("dark"));
}

#[test]
fn mutations_require_sign_in() {
    let mut app = AppState::init(MockGateway::seeded(), MemorySessionStorage::new());
    let err = app.create_note(NoteInput::new("x", "y")).unwrap_err();
    assert!(matches!(err, AppError::NotAuthenticated));
    assert!(matches!(app.delete_note("1"), Err(AppError::NotAuthenticated)));
}

#[test]
fn saving_new_draft_creates_note_and_retargets_editor() {
    let mut app = signed_in();
    let mut draft = app.open_new_note();
    assert_eq!(app.editor(), Some(&EditorTarget::NewNote));

    draft.title = "Draft".to_string();
    let created = app.save_editor(&draft).unwrap();
    assert_eq!(app.editor(), Some(&EditorTarget::Note(created.id.clone())));
    assert_eq!(app.store().list()[0].id, created.id);

    let mut reopened = app.open_note(&created.id).unwrap();
    reopened.content = "body".to_string();
    let updated = app.save_editor(&reopened).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(app.store().get(&created.id).unwrap().content, "body");
}

#[test]
fn deleting_the_edited_note_closes_the_editor() {
    let mut app = signed_in();
    app.open_note("3").unwrap();
    app.delete_note("4").unwrap();
    assert_eq!(app.editor(), Some(&EditorTarget::Note("3".to_string())));

    app.delete_note("3").unwrap();
    assert_eq!(app.editor(), None);
}

#[test]
fn open_note_rejects_unknown_id() {
    let mut app = signed_in();
    assert!(matches!(app.open_note("nope"), Err(AppError::NoteNotFound(_))));
    assert_eq!(app.editor(), None);
}

#[test]
fn update_user_persists_returned_profile() {
    let mut app = signed_in();
    let patch = UserPatch {
        email: Some("new@example.com".to_string()),
        ..UserPatch::default()
    };
    app.update_user(&patch).unwrap();
    assert_eq!(app.current_user().unwrap().email, "new@example.com");
    assert!(app
        .storage()
        .get(KEY_USER)
        .unwrap()
        .unwrap()
        .contains("new@example.com"));
}

#[test]
fn visible_notes_tracks_store_mutations() {
    let mut app = signed_in();
    let filter = NoteFilter::default().with_query("zebra");
    assert!(app.visible_notes(&filter).is_empty());

    app.create_note(NoteInput::new("Zebra facts", "stripes")).unwrap();
    assert_eq!(app.visible_notes(&filter).len(), 1);
}

#[test]
fn sqlite_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session").join("noteboard_session.sqlite3");

    {
        let storage = SqliteSessionStorage::open(&path).unwrap();
        let mut app = AppState::init(MockGateway::seeded(), storage);
        app.login("testuser", "secret").unwrap();
        app.toggle_theme();
    }

    let storage = SqliteSessionStorage::open(&path).unwrap();
    let app = AppState::init(MockGateway::seeded(), storage);
    assert!(app.is_authenticated());
    assert_eq!(app.theme(), ThemeMode::Dark);
}

#[test]
fn drop_note_reorders_full_list_while_view_is_filtered() {
    let mut app = signed_in();
    let filter = NoteFilter::default().with_tag("1");
    let visible: Vec<String> = app
        .visible_notes(&filter)
        .into_iter()
        .map(|note| note.id.clone())
        .collect();
    assert_eq!(visible, vec!["5", "1"]);

    assert!(app.drop_note("5", Some("1")).unwrap());
    assert_eq!(app.store().note_ids(), vec!["5", "1", "2", "3", "4"]);

    assert!(!app.drop_note("5", Some("5")).unwrap());
    assert!(!app.drop_note("5", None).unwrap());
    assert!(!app.drop_note("ghost", Some("1")).unwrap());
    assert_eq!(app.store().note_ids(), vec!["5", "1", "2", "3", "4"]);
}

#[test]
fn drop_note_requires_sign_in() {
    let mut app = AppState::init(MockGateway::seeded(), MemorySessionStorage::new());
    assert!(matches!(
        app.drop_note("1", Some("2")),
        Err(AppError::NotAuthenticated)
    ));
}
