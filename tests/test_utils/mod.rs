//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

use threadchat::api::{AppState, app};
use threadchat::chat::ChatSession;
use threadchat::core::secrets::{API_KEY_SECRET, ASSISTANT_ID_SECRET};
use threadchat::core::{AppConfig, SecretStore};
use threadchat::openai::RetryConfig;

pub const THREAD_ID: &str = "thread_test";
pub const RUN_ID: &str = "run_test";
pub const ASSISTANT_ID: &str = "asst_test";

/// A mock assistant service. The mocks are kept alongside the server
/// so they stay registered for the duration of the test.
pub struct TestBackend {
    pub server: ServerGuard,
    pub mocks: Vec<Mock>,
}

impl TestBackend {
    pub fn url(&self) -> String {
        self.server.url()
    }

    pub async fn assert_all(&self) {
        for mock in self.mocks.iter() {
            mock.assert_async().await;
        }
    }
}

/// Builds a backend whose runs end in `run_status` and whose message
/// listing after the user's message returns `replies`.
pub async fn test_backend(run_status: &str, replies: &[&str]) -> TestBackend {
    let mut server = mockito::Server::new_async().await;
    let mut mocks = vec![];

    mocks.push(
        server
            .mock("GET", format!("/v1/assistants/{}", ASSISTANT_ID).as_str())
            .match_header("authorization", "Bearer test-api-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": ASSISTANT_ID,
                    "object": "assistant",
                    "name": "Test Assistant",
                    "model": "gpt-4o"
                })
                .to_string(),
            )
            .create_async()
            .await,
    );

    mocks.push(
        server
            .mock("POST", "/v1/threads")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"id": THREAD_ID, "object": "thread", "created_at": 1699012949}).to_string())
            .create_async()
            .await,
    );

    mocks.push(
        server
            .mock("POST", format!("/v1/threads/{}/messages", THREAD_ID).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "msg_user",
                    "object": "thread.message",
                    "thread_id": THREAD_ID,
                    "role": "user",
                    "content": [{"type": "text", "text": {"value": "Hello", "annotations": []}}]
                })
                .to_string(),
            )
            .create_async()
            .await,
    );

    mocks.push(
        server
            .mock("POST", format!("/v1/threads/{}/runs", THREAD_ID).as_str())
            .match_body(Matcher::PartialJson(json!({"assistant_id": ASSISTANT_ID})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"id": RUN_ID, "object": "thread.run", "status": "queued"}).to_string())
            .create_async()
            .await,
    );

    let last_error = if run_status == "failed" {
        json!({"code": "server_error", "message": "Sorry, something went wrong."})
    } else {
        json!(null)
    };
    mocks.push(
        server
            .mock("GET", format!("/v1/threads/{}/runs/{}", THREAD_ID, RUN_ID).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": RUN_ID,
                    "object": "thread.run",
                    "thread_id": THREAD_ID,
                    "assistant_id": ASSISTANT_ID,
                    "status": run_status,
                    "last_error": last_error
                })
                .to_string(),
            )
            .create_async()
            .await,
    );

    let data: Vec<_> = replies
        .iter()
        .enumerate()
        .map(|(i, reply)| {
            json!({
                "id": format!("msg_reply_{}", i),
                "object": "thread.message",
                "thread_id": THREAD_ID,
                "role": "assistant",
                "content": [{"type": "text", "text": {"value": reply, "annotations": []}}],
                "run_id": RUN_ID
            })
        })
        .collect();
    mocks.push(
        server
            .mock("GET", format!("/v1/threads/{}/messages", THREAD_ID).as_str())
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("order".into(), "asc".into()),
                Matcher::UrlEncoded("after".into(), "msg_user".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"object": "list", "data": data, "has_more": false}).to_string())
            .create_async()
            .await,
    );

    TestBackend { server, mocks }
}

pub fn test_config(api_hostname: &str) -> AppConfig {
    let secrets = SecretStore::default()
        .with(API_KEY_SECRET, "test-api-key")
        .with(ASSISTANT_ID_SECRET, ASSISTANT_ID);
    let mut config = AppConfig::new(secrets);
    config.api_hostname = api_hostname.to_string();
    config.title = String::from("Test Assistant");
    config.poll.interval = Duration::from_millis(10);
    config.poll.max_wait = Duration::from_secs(5);
    config.retry = RetryConfig::none();
    config
}

/// Creates a test application router talking to `backend`.
pub async fn test_app(backend: &TestBackend) -> Router {
    let config = test_config(&backend.url());
    let session = ChatSession::start(&config)
        .await
        .expect("Failed to start chat session");
    app(Arc::new(AppState::new(config, session)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
