//! REST gateway over a blocking HTTP client.
//!
//! # Responsibility
//! - Map gateway operations onto the `/auth`, `/notes` and `/tags` routes.
//! - Attach the bearer token to every authenticated request.
//!
//! # Invariants
//! - Any non-2xx status is an error; bodies of failed responses are ignored.
//! - Note ids are sent as single path segments, never spliced into paths.

use super::{GatewayError, GatewayResult, PersistenceGateway};
use crate::model::note::{Note, NoteInput, NotePatch};
use crate::model::tag::{Tag, TagInput};
use crate::model::user::{User, UserPatch};
use log::{error, info};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Login/register response: a user, optionally carrying a session token.
#[derive(Debug, Deserialize)]
struct AuthenticatedUser {
    #[serde(flatten)]
    user: User,
    #[serde(default, alias = "accessToken")]
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Gateway talking to a JSON REST backend.
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpGateway {
    /// Creates a gateway rooted at `base_url` (e.g. `http://localhost:8080/api`).
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let base_url = Url::parse(base_url.trim()).map_err(|err| {
            GatewayError::InvalidInput(format!("invalid api base url `{base_url}`: {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidInput(format!(
                "api base url `{base_url}` cannot carry paths"
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Root every route is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder, operation: &'static str) -> GatewayResult<Response> {
        let started_at = Instant::now();
        let response = match request.send() {
            Ok(response) => response,
            Err(err) => {
                error!(
                    "event={operation} module=gateway status=error backend=http duration_ms={} error_code=transport error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!(
                "event={operation} module=gateway status=error backend=http duration_ms={} http_status={}",
                started_at.elapsed().as_millis(),
                status.as_u16()
            );
            return Err(GatewayError::Status {
                status: status.as_u16(),
                operation,
            });
        }

        info!(
            "event={operation} module=gateway status=ok backend=http duration_ms={} http_status={}",
            started_at.elapsed().as_millis(),
            status.as_u16()
        );
        Ok(response)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> GatewayResult<T> {
        let response = self.send(request, operation)?;
        response.json::<T>().map_err(|err| {
            error!("event={operation} module=gateway status=error backend=http error_code=decode");
            GatewayError::Decode(err.to_string())
        })
    }

    fn authenticate(
        &mut self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> GatewayResult<User> {
        let authenticated: AuthenticatedUser = self.send_json(request, operation)?;
        if authenticated.token.is_some() {
            self.token = authenticated.token;
        }
        Ok(authenticated.user)
    }
}

/// Maps a note-route 404 onto `NotFound` so callers see the missing id.
fn note_not_found(id: &str) -> impl FnOnce(GatewayError) -> GatewayError + '_ {
    move |err| match err {
        GatewayError::Status { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
            GatewayError::NotFound(id.to_string())
        }
        other => other,
    }
}

impl PersistenceGateway for HttpGateway {
    fn name(&self) -> &'static str {
        "http"
    }

    fn login(&mut self, username: &str, password: &str) -> GatewayResult<User> {
        let request = self
            .client
            .post(self.endpoint(&["auth", "login"]))
            .json(&LoginRequest { username, password });
        self.authenticate(request, "auth_login")
    }

    fn register(&mut self, username: &str, email: &str, password: &str) -> GatewayResult<User> {
        let request = self
            .client
            .post(self.endpoint(&["auth", "register"]))
            .json(&RegisterRequest {
                username,
                email,
                password,
            });
        self.authenticate(request, "auth_register")
    }

    fn list_notes(&mut self) -> GatewayResult<Vec<Note>> {
        let request = self.authorized(self.client.get(self.endpoint(&["notes"])));
        self.send_json(request, "notes_list")
    }

    fn get_note(&mut self, id: &str) -> GatewayResult<Note> {
        let request = self.authorized(self.client.get(self.endpoint(&["notes", id])));
        self.send_json(request, "note_get")
            .map_err(note_not_found(id))
    }

    fn create_note(&mut self, input: &NoteInput) -> GatewayResult<Note> {
        let request = self.authorized(self.client.post(self.endpoint(&["notes"])).json(input));
        self.send_json(request, "note_create")
    }

    fn update_note(&mut self, id: &str, patch: &NotePatch) -> GatewayResult<Note> {
        let request = self.authorized(
            self.client
                .put(self.endpoint(&["notes", id]))
                .json(patch),
        );
        self.send_json(request, "note_update")
            .map_err(note_not_found(id))
    }

    fn delete_note(&mut self, id: &str) -> GatewayResult<()> {
        let request = self.authorized(self.client.delete(self.endpoint(&["notes", id])));
        self.send(request, "note_delete")
            .map(|_| ())
            .map_err(note_not_found(id))
    }

    fn list_tags(&mut self) -> GatewayResult<Vec<Tag>> {
        let request = self.authorized(self.client.get(self.endpoint(&["tags"])));
        self.send_json(request, "tags_list")
    }

    fn create_tag(&mut self, input: &TagInput) -> GatewayResult<Tag> {
        let request = self.authorized(self.client.post(self.endpoint(&["tags"])).json(input));
        self.send_json(request, "tag_create")
    }

    fn update_user(&mut self, _patch: &UserPatch) -> GatewayResult<User> {
        Err(GatewayError::Unsupported("update_user"))
    }

    fn auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn set_auth_token(&mut self, token: Option<String>) {
        self.token = token;
    }
}
