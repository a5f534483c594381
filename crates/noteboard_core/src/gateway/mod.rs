//! Persistence gateway contracts and implementations.
//!
//! # Responsibility
//! - Define the CRUD boundary consumed by the note store and app state.
//! - Provide interchangeable mock (in-memory) and HTTP implementations.
//!
//! # Invariants
//! - Gateways assign ids and timestamps; callers never do.
//! - Callers treat every `GatewayError` as a generic failed operation.

use crate::model::note::{Note, NoteInput, NotePatch};
use crate::model::tag::{Tag, TagInput};
use crate::model::user::{User, UserPatch};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod backend;
pub mod http;
pub mod mock;

pub use backend::BackendGateway;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure reported by a gateway call.
#[derive(Debug)]
pub enum GatewayError {
    /// Network or client-level failure before a response was read.
    Transport(reqwest::Error),
    /// Server answered with a non-success status.
    Status { status: u16, operation: &'static str },
    /// Response body could not be decoded.
    Decode(String),
    /// Target entity does not exist.
    NotFound(String),
    /// Operation is not offered by this backend.
    Unsupported(&'static str),
    /// Request rejected before reaching the backend.
    InvalidInput(String),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "request failed: {err}"),
            Self::Status { status, operation } => {
                write!(f, "request failed: {operation} returned HTTP {status}")
            }
            Self::Decode(message) => write!(f, "request failed: invalid response: {message}"),
            Self::NotFound(id) => write!(f, "request failed: note not found: {id}"),
            Self::Unsupported(operation) => {
                write!(f, "request failed: `{operation}` is not supported by this backend")
            }
            Self::InvalidInput(message) => write!(f, "request failed: {message}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return Self::Decode(value.to_string());
        }
        Self::Transport(value)
    }
}

/// CRUD data-access boundary for notes, tags and users.
pub trait PersistenceGateway {
    /// Short backend name used in diagnostics.
    fn name(&self) -> &'static str;

    fn login(&mut self, username: &str, password: &str) -> GatewayResult<User>;
    fn register(&mut self, username: &str, email: &str, password: &str) -> GatewayResult<User>;

    fn list_notes(&mut self) -> GatewayResult<Vec<Note>>;
    fn get_note(&mut self, id: &str) -> GatewayResult<Note>;
    fn create_note(&mut self, input: &NoteInput) -> GatewayResult<Note>;
    fn update_note(&mut self, id: &str, patch: &NotePatch) -> GatewayResult<Note>;
    fn delete_note(&mut self, id: &str) -> GatewayResult<()>;

    fn list_tags(&mut self) -> GatewayResult<Vec<Tag>>;
    fn create_tag(&mut self, input: &TagInput) -> GatewayResult<Tag>;

    fn update_user(&mut self, patch: &UserPatch) -> GatewayResult<User>;

    /// Bearer token issued by the last successful login/register, if any.
    fn auth_token(&self) -> Option<String>;
    /// Installs (or clears) the bearer token, e.g. on session restore.
    fn set_auth_token(&mut self, token: Option<String>);
}
