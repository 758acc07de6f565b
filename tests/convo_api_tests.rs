//! Integration tests for the convos HTTP API.
//!
//! Each test starts the real router on an ephemeral port backed by an
//! in-memory database and drives it over HTTP.
//!
//! Tests cover:
//! - Creating a thread and replying to it (`POST /convos`, `POST /convos/{id}/reply`)
//! - Listing and fetching with visibility scoping (`GET /convos`, `GET /convos/{id}`)
//! - Read status toggling (`PATCH /convos/{id}`)
//! - Deleting (`DELETE /convos/{id}`)
//! - Envelope shape and status codes for errors

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tokio::sync::oneshot;

use convos::convos::{StorageConfig, StorageGateway, UserId};
use convos::server::{self, AppState, USER_API_KEY_HEADER};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let gateway = Arc::new(
            StorageGateway::open(StorageConfig::in_memory())
                .await
                .expect("open storage"),
        );
        for (id, name) in [(1, "Alice"), (2, "Bob")] {
            gateway.add_user(UserId::new(id), name).await.unwrap();
        }

        let state = AppState::from_gateway(gateway);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind server");
        let addr: SocketAddr = listener.local_addr().expect("local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            server::serve(listener, state, async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            shutdown: Some(shutdown_tx),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        user: Option<&str>,
        payload: Option<&Value>,
    ) -> (StatusCode, Value) {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.request(method, url);
        if let Some(key) = user {
            request = request.header(USER_API_KEY_HEADER, key);
        }
        if let Some(payload) = payload {
            request = request.json(payload);
        }
        let response = request.send().await.expect("request failed");
        let status = response.status();
        let body = response.json::<Value>().await.expect("json body");
        (status, body)
    }

    async fn get(&self, path: &str, user: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, path, user, None).await
    }

    async fn post(&self, path: &str, user: Option<&str>, body: &Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, user, Some(body)).await
    }

    async fn patch(&self, path: &str, user: Option<&str>, body: &Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, path, user, Some(body)).await
    }

    async fn delete(&self, path: &str, user: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, user, None).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
    }
}

fn first_post() -> Value {
    json!({"sender": 1, "recipient": 2, "subject": "First Post", "body": "Message Body"})
}

fn assert_error_envelope(body: &Value) {
    assert_eq!(body["response"], "");
    assert_eq!(body["meta"]["count"], "1");
    let message = body["error"]["message"].as_str().unwrap_or_default();
    assert!(!message.is_empty(), "error message should be set: {body}");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_root_envelope() {
    let server = TestServer::start().await;

    let (status, body) = server.post("/convos", Some("1"), &first_post()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "response": {
                "id": 1, "parent": 1, "sender": 1, "recipient": 2,
                "subject": "First Post", "body": "Message Body", "read": true
            },
            "meta": {"count": "1"},
            "error": null
        })
    );
}

#[tokio::test]
async fn create_uses_acting_user_as_sender() {
    let server = TestServer::start().await;

    let post = json!({"recipient": 2, "subject": "First Post", "body": "Message Body"});
    let (status, body) = server.post("/convos", Some("1"), &post).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["sender"], 1);

    let spoofed = json!({"sender": 2, "recipient": 1, "subject": "Spoof", "body": "x"});
    let (_, body) = server.post("/convos", Some("1"), &spoofed).await;
    assert_eq!(body["response"]["sender"], 1);
}

#[tokio::test]
async fn create_without_body_is_rejected() {
    let server = TestServer::start().await;

    let (status, body) = server.send(Method::POST, "/convos", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn reply_inherits_thread_and_subject() {
    let server = TestServer::start().await;
    let (_, root) = server.post("/convos", Some("1"), &first_post()).await;
    let root_id = root["response"]["id"].as_i64().unwrap_or_default();

    let reply = json!({"recipient": 1, "subject": "Other", "body": "Reply Body"});
    let (status, body) = server
        .post(&format!("/convos/{root_id}/reply"), Some("2"), &reply)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["parent"], root_id);
    assert_eq!(body["response"]["subject"], "First Post");
    assert_eq!(body["response"]["sender"], 2);
    assert_eq!(body["response"]["read"], true);

    // Replies are not thread roots, so the listing still holds one item.
    let (_, listed) = server.get("/convos", Some("2")).await;
    assert_eq!(listed["meta"]["count"], "1");

    let path = format!("/convos/{root_id}/thread");
    let (status, thread) = server.get(&path, Some("1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["response"]["replies"][0]["body"], "Reply Body");
    assert_eq!(thread["response"]["replies"][0]["read"], false);
}

#[tokio::test]
async fn reply_to_hidden_convo_is_not_found() {
    let server = TestServer::start().await;
    let (_, root) = server.post("/convos", Some("1"), &first_post()).await;
    let root_id = root["response"]["id"].as_i64().unwrap_or_default();

    let reply = json!({"recipient": 1, "body": "intrusion"});
    let (status, body) = server
        .post(&format!("/convos/{root_id}/reply"), Some("3"), &reply)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn list_is_scoped_to_acting_user() {
    let server = TestServer::start().await;
    server.post("/convos", Some("1"), &first_post()).await;
    let second = json!({"recipient": 1, "subject": "Second", "body": "b"});
    server.post("/convos", Some("2"), &second).await;

    let (status, body) = server.get("/convos", Some("1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], "2");
    assert_eq!(body["response"][0]["id"], 1);
    assert_eq!(body["response"][1]["id"], 2);
    assert_eq!(body["response"][0]["read"], true);
    assert_eq!(body["response"][1]["read"], false);

    let (status, body) = server.get("/convos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], json!([]));
    assert_eq!(body["meta"]["count"], "0");
    assert_eq!(body["error"], Value::Null);
}

#[tokio::test]
async fn get_missing_or_foreign_convo_is_not_found() {
    let server = TestServer::start().await;
    server.post("/convos", Some("1"), &first_post()).await;

    let (status, body) = server.get("/convos/999", Some("2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body);

    let (status, body) = server.get("/convos/1", Some("3")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body);

    let (status, _) = server.get("/convos/not-a-number", Some("1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server.get("/convos/1", Some("2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["read"], false);
}

#[tokio::test]
async fn patch_toggles_read_status() {
    let server = TestServer::start().await;
    server.post("/convos", Some("1"), &first_post()).await;

    let (status, body) = server
        .patch("/convos/1", Some("1"), &json!({"read": "false"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["read"], false);

    let (_, body) = server.get("/convos/1", Some("1")).await;
    assert_eq!(body["response"]["read"], false);

    let (_, body) = server
        .patch("/convos/1", Some("1"), &json!({"read": "true"}))
        .await;
    assert_eq!(body["response"]["read"], true);
    let (_, body) = server
        .patch("/convos/1", Some("1"), &json!({"read": "true"}))
        .await;
    assert_eq!(body["response"]["read"], true);
}

#[tokio::test]
async fn patch_rejects_unknown_fields_and_outsiders() {
    let server = TestServer::start().await;
    server.post("/convos", Some("1"), &first_post()).await;

    let (status, body) = server
        .patch("/convos/1", Some("1"), &json!({"subject": "rewrite"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body);

    let (status, body) = server
        .patch("/convos/1", Some("3"), &json!({"read": "true"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn delete_removes_convo_for_everyone() {
    let server = TestServer::start().await;
    server.post("/convos", Some("1"), &first_post()).await;

    let (status, _) = server.delete("/convos/1", Some("3")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server.delete("/convos/1", Some("2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"response": "success", "meta": {"count": "1"}, "error": null})
    );

    for user in ["1", "2"] {
        let (status, body) = server.get("/convos/1", Some(user)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_error_envelope(&body);
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "convos");
}
