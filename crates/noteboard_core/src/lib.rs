//! Core client logic for Noteboard.
//! Session state, note list derivations and persistence gateways live here;
//! views bind through the FFI crate.

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;

pub use config::{BackendKind, ClientConfig, ConfigError};
pub use gateway::http::HttpGateway;
pub use gateway::mock::MockGateway;
pub use gateway::{BackendGateway, GatewayError, GatewayResult, PersistenceGateway};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteDraft, NoteId, NoteInput, NotePatch};
pub use model::tag::{Tag, TagId, TagInput, TagValidationError};
pub use model::user::{ThemeMode, User, UserPatch};
pub use session::app_state::{AppError, AppResult, AppState, EditorTarget};
pub use session::storage::{
    MemorySessionStorage, SessionStorage, SqliteSessionStorage, StorageError,
};
pub use store::note_store::{NoteStore, StoreError, StoreResult};
pub use store::reorder::{drop_ordering, move_item, Activation, DragController, DragState, Point};
pub use store::view::{filter_notes, NoteFilter};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
