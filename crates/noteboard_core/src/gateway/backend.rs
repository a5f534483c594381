//! Config-selected gateway.

use super::http::HttpGateway;
use super::mock::MockGateway;
use super::{GatewayResult, PersistenceGateway};
use crate::config::{BackendKind, ClientConfig};
use crate::model::note::{Note, NoteInput, NotePatch};
use crate::model::tag::{Tag, TagInput};
use crate::model::user::{User, UserPatch};
use log::info;
use std::time::Duration;

/// Either gateway implementation, chosen at runtime.
pub enum BackendGateway {
    Mock(MockGateway),
    Http(HttpGateway),
}

impl BackendGateway {
    /// Builds the gateway selected by `config.backend`.
    ///
    /// The mock backend starts with demo data.
    pub fn from_config(config: &ClientConfig) -> GatewayResult<Self> {
        let gateway = match config.backend {
            BackendKind::Mock => Self::Mock(MockGateway::seeded()),
            BackendKind::Http => Self::Http(HttpGateway::new(
                config.api_base_url.as_str(),
                Duration::from_secs(config.request_timeout_secs),
            )?),
        };
        info!(
            "event=gateway_init module=gateway status=ok backend={}",
            gateway.name()
        );
        Ok(gateway)
    }

    fn inner(&self) -> &dyn PersistenceGateway {
        match self {
            Self::Mock(gateway) => gateway,
            Self::Http(gateway) => gateway,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn PersistenceGateway {
        match self {
            Self::Mock(gateway) => gateway,
            Self::Http(gateway) => gateway,
        }
    }
}

impl PersistenceGateway for BackendGateway {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn login(&mut self, username: &str, password: &str) -> GatewayResult<User> {
        self.inner_mut().login(username, password)
    }

    fn register(&mut self, username: &str, email: &str, password: &str) -> GatewayResult<User> {
        self.inner_mut().register(username, email, password)
    }

    fn list_notes(&mut self) -> GatewayResult<Vec<Note>> {
        self.inner_mut().list_notes()
    }

    fn get_note(&mut self, id: &str) -> GatewayResult<Note> {
        self.inner_mut().get_note(id)
    }

    fn create_note(&mut self, input: &NoteInput) -> GatewayResult<Note> {
        self.inner_mut().create_note(input)
    }

    fn update_note(&mut self, id: &str, patch: &NotePatch) -> GatewayResult<Note> {
        self.inner_mut().update_note(id, patch)
    }

    fn delete_note(&mut self, id: &str) -> GatewayResult<()> {
        self.inner_mut().delete_note(id)
    }

    fn list_tags(&mut self) -> GatewayResult<Vec<Tag>> {
        self.inner_mut().list_tags()
    }

    fn create_tag(&mut self, input: &TagInput) -> GatewayResult<Tag> {
        self.inner_mut().create_tag(input)
    }

    fn update_user(&mut self, patch: &UserPatch) -> GatewayResult<User> {
        self.inner_mut().update_user(patch)
    }

    fn auth_token(&self) -> Option<String> {
        self.inner().auth_token()
    }

    fn set_auth_token(&mut self, token: Option<String>) {
        self.inner_mut().set_auth_token(token);
    }
}
