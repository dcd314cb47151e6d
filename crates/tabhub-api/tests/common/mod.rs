#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use tabhub_api::{AppStateInner, router};
use tabhub_db::Database;

pub const BOUNDARY: &str = "tabhub-test-boundary";

/// The real router over a throwaway database file.
pub struct TestApp {
    pub app: Router,
    path: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_upload_limit(1024 * 1024)
    }

    pub fn with_upload_limit(max_upload_bytes: usize) -> Self {
        Self::build(Duration::from_secs(5), Duration::from_secs(5), max_upload_bytes)
    }

    /// `storage_timeout` bounds each storage call, `busy_timeout` is how long
    /// SQLite waits on a locked database before giving up.
    pub fn with_timeouts(storage_timeout: Duration, busy_timeout: Duration) -> Self {
        Self::build(storage_timeout, busy_timeout, 1024 * 1024)
    }

    fn build(storage_timeout: Duration, busy_timeout: Duration, max_upload_bytes: usize) -> Self {
        let path = std::env::temp_dir().join(format!("tabhub_api_test_{}.db", uuid::Uuid::new_v4()));
        let db = Database::open(&path, busy_timeout).unwrap();
        let state = Arc::new(AppStateInner {
            db,
            storage_timeout,
            max_upload_bytes,
        });
        Self {
            app: router(state),
            path,
        }
    }

    /// A second, raw connection to the same database file.
    pub fn raw_connection(&self) -> rusqlite::Connection {
        rusqlite::Connection::open(&self.path).unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        read(self.send(req).await).await
    }

    pub async fn put(&self, uri: &str) -> (StatusCode, Value) {
        let req = Request::put(uri).body(Body::empty()).unwrap();
        read(self.send(req).await).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        read(self.send(req).await).await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)], pdf: Option<&[u8]>) -> (StatusCode, Value) {
        let req = Request::post(uri)
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(multipart_body(fields, pdf)))
            .unwrap();
        read(self.send(req).await).await
    }

    pub async fn send_raw(&self, method: &str, uri: &str, content_type: Option<&str>, body: Vec<u8>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            req = req.header("content-type", content_type);
        }
        read(self.send(req.body(Body::from(body)).unwrap()).await).await
    }

    /// Sign up a user and return its id.
    pub async fn signup(&self, username: &str, password: &str) -> i64 {
        let (status, body) = self
            .post_json("/api/users", signup_body(username, password))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    /// Create a request through the plain endpoint.
    pub async fn create_request(&self, id: &str, user_id: i64, song: &str, artist: &str) -> Value {
        let (status, body) = self
            .post_json("/api/requests", request_body(id, user_id, song, artist))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}

pub fn signup_body(username: &str, password: &str) -> Value {
    json!({
        "username": username,
        "name": username,
        "email": format!("{username}@example.com"),
        "password": password,
    })
}

pub fn request_body(id: &str, user_id: i64, song: &str, artist: &str) -> Value {
    json!({
        "id": id,
        "user": "alice",
        "song": song,
        "artist": artist,
        "comment": "standard tuning please",
        "link": format!("/request/{id}"),
        "userId": user_id,
    })
}

pub fn reply_fields<'a>(request_id: &'a str, user_id: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("request_id", request_id),
        ("username", "bob"),
        ("comment", "capo on 2"),
        ("userId", user_id),
        ("song", "Clocks"),
        ("artist", "Coldplay"),
    ]
}

pub fn multipart_body(fields: &[(&str, &str)], pdf: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    if let Some(pdf) = pdf {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"pdf\"; filename=\"tab.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(pdf);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn read(resp: Response<Body>) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}
