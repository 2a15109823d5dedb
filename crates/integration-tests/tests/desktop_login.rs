//! Desktop variant: window-host login over the event stream.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use dsf_integration_tests::{FakeRiot, GOOD_REDIRECT, TestServer, storefront_payload};
use serde_json::{Value, json};

/// Reads `event:`/`data:` pairs off an SSE response.
struct EventReader {
    response: reqwest::Response,
    buffer: String,
}

impl EventReader {
    async fn open(server: &TestServer) -> Self {
        let response = server.get("/api/events").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()["content-type"]
                .to_str()
                .unwrap()
                .starts_with("text/event-stream")
        );
        Self {
            response,
            buffer: String::new(),
        }
    }

    /// Next named event and its JSON data. Keep-alive comments are skipped.
    async fn next(&mut self) -> (String, Value) {
        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                if let Some(end) = self.buffer.find("\n\n") {
                    let block: String = self.buffer.drain(..end + 2).collect();
                    let mut name = None;
                    let mut data = None;
                    for line in block.lines() {
                        if let Some(rest) = line.strip_prefix("event:") {
                            name = Some(rest.trim().to_string());
                        } else if let Some(rest) = line.strip_prefix("data:") {
                            data = Some(serde_json::from_str(rest.trim()).unwrap());
                        }
                    }
                    if let (Some(name), Some(data)) = (name, data) {
                        return (name, data);
                    }
                    continue;
                }
                let chunk = self.response.chunk().await.unwrap().unwrap();
                self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
            }
        })
        .await
        .unwrap()
    }

    /// Skip ahead to the first event whose name starts with `prefix`.
    async fn next_matching(&mut self, prefix: &str) -> (String, Value) {
        loop {
            let event = self.next().await;
            if event.0.starts_with(prefix) {
                return event;
            }
        }
    }
}

async fn navigate(server: &TestServer, url: &str) -> StatusCode {
    server
        .post_json("/api/login/navigate", &json!({ "url": url }))
        .await
        .status()
}

#[tokio::test]
async fn test_desktop_login_end_to_end() {
    let riot = FakeRiot::spawn(storefront_payload(&["A", "B"], &[("A", 100)])).await;
    let server = TestServer::spawn("desktop", &riot, vec![]).await;
    let mut events = EventReader::open(&server).await;

    assert_eq!(
        server.post("/api/login/start").await.status(),
        StatusCode::ACCEPTED
    );

    let (name, open) = events.next().await;
    assert_eq!(name, "surface-open");
    assert!(
        open["url"]
            .as_str()
            .unwrap()
            .starts_with(&format!("{}/authorize?", riot.base_url))
    );
    let attempt = open["attempt"].clone();

    assert_eq!(
        navigate(&server, &format!("{}/login", riot.base_url)).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(navigate(&server, GOOD_REDIRECT).await, StatusCode::NO_CONTENT);

    // Hidden before it is closed, then the page is told to load the store
    assert_eq!(
        events.next().await,
        (
            "surface-hide".to_string(),
            json!({ "type": "surface-hide", "attempt": attempt })
        )
    );
    assert_eq!(
        events.next().await,
        (
            "surface-close".to_string(),
            json!({ "type": "surface-close", "attempt": attempt })
        )
    );
    assert_eq!(
        events.next().await,
        (
            "login-success".to_string(),
            json!({ "type": "login-success", "attempt": attempt })
        )
    );

    let body: Value = server.get("/api/store").await.json().await.unwrap();
    assert_eq!(body["items"][0]["price"], 100);
    assert_eq!(body["items"][1]["price"], "???");
}

#[tokio::test]
async fn test_desktop_login_failure_event() {
    let riot = FakeRiot::spawn(json!({})).await;
    let server = TestServer::spawn("desktop", &riot, vec![]).await;
    let mut events = EventReader::open(&server).await;

    server.post("/api/login/start").await;
    let (_, open) = events.next_matching("surface-open").await;
    navigate(&server, "https://playvalorant.com/opt_in#access_token=only-access").await;

    let (name, data) = events.next_matching("login-").await;
    assert_eq!(name, "login-failed");
    assert_eq!(data["reason"], "no ID token found in URL");
    assert_eq!(data["attempt"], open["attempt"]);

    assert_eq!(
        server.get("/api/store").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert!(riot.requests().is_empty());
}

#[tokio::test]
async fn test_restart_cancels_previous_attempt() {
    let riot = FakeRiot::spawn(json!({})).await;
    let server = TestServer::spawn("desktop", &riot, vec![]).await;
    let mut events = EventReader::open(&server).await;

    server.post("/api/login/start").await;
    let (_, first) = events.next_matching("surface-open").await;

    server.post("/api/login/start").await;
    let (_, second) = events.next_matching("surface-open").await;
    assert_ne!(first["attempt"], second["attempt"]);

    // The superseded attempt's outcome names it, so the page can ignore it
    let (name, cancelled) = events.next_matching("login-").await;
    assert_eq!(name, "login-cancelled");
    assert_eq!(cancelled["attempt"], first["attempt"]);

    let status: Value = server.get("/api/login/status").await.json().await.unwrap();
    assert_eq!(
        status,
        json!({ "state": "awaiting", "attempt": second["attempt"] })
    );

    // A late report from the first window is refused
    let stale = server
        .post_json(
            "/api/login/navigate",
            &json!({ "url": GOOD_REDIRECT, "attempt": first["attempt"] }),
        )
        .await;
    assert_eq!(stale.status(), StatusCode::CONFLICT);

    assert_eq!(
        server.post("/api/login/cancel").await.status(),
        StatusCode::NO_CONTENT
    );
    let status: Value = server.get("/api/login/status").await.json().await.unwrap();
    assert_eq!(
        status,
        json!({
            "state": "completed",
            "outcome": { "type": "login-cancelled", "attempt": second["attempt"] }
        })
    );

    let (name, cancelled) = events.next_matching("login-").await;
    assert_eq!(name, "login-cancelled");
    assert_eq!(cancelled["attempt"], second["attempt"]);
    assert_eq!(
        navigate(&server, GOOD_REDIRECT).await,
        StatusCode::CONFLICT
    );
    assert!(server.state.session().tokens().await.is_none());
}

#[tokio::test]
async fn test_malformed_navigate_body_is_json_error() {
    let riot = FakeRiot::spawn(json!({})).await;
    let server = TestServer::spawn("desktop", &riot, vec![]).await;
    server.post("/api/login/start").await;

    let response = server
        .post_json("/api/login/navigate", &json!({ "href": GOOD_REDIRECT }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("url"));
}

#[tokio::test]
async fn test_web_login_route_absent_on_desktop() {
    let riot = FakeRiot::spawn(json!({})).await;
    let server = TestServer::spawn("desktop", &riot, vec![]).await;

    let response = server
        .post_json("/api/login", &json!({ "url": GOOD_REDIRECT }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let html = server.get("/").await.text().await.unwrap();
    assert!(html.contains(r#"data-variant="desktop""#));
    assert!(html.contains("start-login"));
    assert!(!html.contains("paste-form"));
}
