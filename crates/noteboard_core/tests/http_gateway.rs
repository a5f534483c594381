use noteboard_core::{GatewayError, HttpGateway, NoteInput, NotePatch, PersistenceGateway};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug)]
struct Recorded {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Serves one canned `(status, body)` per connection, in order.
fn serve(responses: Vec<(u16, &'static str)>) -> (String, Receiver<Recorded>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}/api", listener.local_addr().unwrap());
    let (sender, receiver) = mpsc::channel();

    let handle = thread::spawn(move || {
        for (status, body) in responses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    headers.push((key.trim().to_string(), value.trim().to_string()));
                }
            }
            let length = headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
                .map(|(_, value)| value.parse::<usize>().unwrap())
                .unwrap_or(0);
            let mut raw_body = vec![0; length];
            reader.read_exact(&mut raw_body).unwrap();

            sender
                .send(Recorded {
                    request_line: request_line.trim_end().to_string(),
                    headers,
                    body: String::from_utf8(raw_body).unwrap(),
                })
                .unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
        }
    });

    (base_url, receiver, handle)
}

const NOTE_JSON: &str = r#"{"id":"n1","title":"T","content":"C","tags":["1"],"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-02T00:00:00Z"}"#;

fn gateway(base_url: &str) -> HttpGateway {
    HttpGateway::new(base_url, Duration::from_secs(5)).unwrap()
}

#[test]
fn login_captures_token_and_authorizes_note_requests() {
    let (base_url, requests, server) = serve(vec![
        (
            200,
            r#"{"id":"7","username":"ana","email":"ana@example.com","accessToken":"jwt-1"}"#,
        ),
        (200, "[]"),
    ]);
    let mut gateway = gateway(&base_url);

    let user = gateway.login("ana", "pw").unwrap();
    assert_eq!(user.username, "ana");
    assert_eq!(gateway.auth_token().as_deref(), Some("jwt-1"));
    assert!(gateway.list_notes().unwrap().is_empty());
    server.join().unwrap();

    let login = requests.recv().unwrap();
    assert_eq!(login.request_line, "POST /api/auth/login HTTP/1.1");
    assert_eq!(
        login.json(),
        serde_json::json!({ "username": "ana", "password": "pw" })
    );
    assert!(login.header("authorization").is_none());

    let list = requests.recv().unwrap();
    assert_eq!(list.request_line, "GET /api/notes HTTP/1.1");
    assert_eq!(list.header("authorization"), Some("Bearer jwt-1"));
}

#[test]
fn create_and_update_send_camel_case_bodies() {
    let (base_url, requests, server) = serve(vec![(201, NOTE_JSON), (200, NOTE_JSON)]);
    let mut gateway = gateway(&base_url);
    gateway.set_auth_token(Some("tok".to_string()));

    let created = gateway
        .create_note(&NoteInput::new("T", "C").with_tags(vec!["1".to_string()]))
        .unwrap();
    assert_eq!(created.id, "n1");
    assert!(created.updated_at >= created.created_at);
    gateway.update_note("n1", &NotePatch::title("T")).unwrap();
    server.join().unwrap();

    let create = requests.recv().unwrap();
    assert_eq!(create.request_line, "POST /api/notes HTTP/1.1");
    assert_eq!(
        create.json(),
        serde_json::json!({ "title": "T", "content": "C", "tags": ["1"] })
    );

    let update = requests.recv().unwrap();
    assert_eq!(update.request_line, "PUT /api/notes/n1 HTTP/1.1");
    assert_eq!(update.json(), serde_json::json!({ "title": "T" }));
}

#[test]
fn status_failures_map_to_gateway_errors() {
    let (base_url, _requests, server) = serve(vec![
        (404, r#"{"message":"Note not found!"}"#),
        (500, "{}"),
        (204, ""),
    ]);
    let mut gateway = gateway(&base_url);

    assert!(matches!(
        gateway.get_note("n9"),
        Err(GatewayError::NotFound(id)) if id == "n9"
    ));
    assert!(matches!(
        gateway.list_tags(),
        Err(GatewayError::Status { status: 500, .. })
    ));
    gateway.delete_note("n1").unwrap();
    server.join().unwrap();
}

#[test]
fn malformed_body_is_a_decode_error() {
    let (base_url, _requests, server) = serve(vec![(200, r#"{"unexpected":true}"#)]);
    let mut gateway = gateway(&base_url);

    assert!(matches!(gateway.list_notes(), Err(GatewayError::Decode(_))));
    server.join().unwrap();
}

#[test]
fn update_user_is_unsupported_over_http() {
    let mut gateway = gateway("http://127.0.0.1:9/api");
    assert!(matches!(
        gateway.update_user(&Default::default()),
        Err(GatewayError::Unsupported("update_user"))
    ));
}
