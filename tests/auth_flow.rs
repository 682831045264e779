//! Integration tests for the session refresh and dispatch flow against a
//! mock dashboard API.

use std::{sync::Arc, time::Duration};

use sitewatch::{
    auth::{ApiRequest, AuthDispatcher, RefreshCoordinator, SessionStore},
    config::HttpRetryConfig,
    http_client::create_retryable_http_client,
    models::CredentialPair,
    persistence::{FilePreferenceStore, PreferenceStore},
    providers::HttpAuthExchange,
};
use url::Url;

struct Stack {
    dispatcher: Arc<AuthDispatcher>,
    store: Arc<FilePreferenceStore>,
    _dir: tempfile::TempDir,
}

fn build_stack(server_url: &str, pair: CredentialPair) -> Stack {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FilePreferenceStore::new(dir.path().join("preferences.json")));
    let session = Arc::new(SessionStore::from_pair(Some(pair)));
    let retry = HttpRetryConfig { max_retries: 0, ..HttpRetryConfig::default() };
    let client = Arc::new(create_retryable_http_client(&retry).expect("client"));
    let base_url = Url::parse(server_url).expect("server url");
    let exchange = Arc::new(HttpAuthExchange::new(base_url.clone(), client.clone()));
    let coordinator = Arc::new(RefreshCoordinator::new(
        Arc::clone(&session),
        exchange,
        store.clone(),
        Duration::from_secs(5),
    ));
    let dispatcher =
        Arc::new(AuthDispatcher::new(base_url, client, session, coordinator));
    Stack { dispatcher, store, _dir: dir }
}

#[tokio::test]
async fn overlapping_401s_share_a_single_refresh_exchange() {
    let mut server = mockito::Server::new_async().await;

    let refresh = server
        .mock("POST", "/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessCredential":"new-access","refreshCredential":"new-refresh"}"#)
        .expect(1)
        .create_async()
        .await;
    let rejected = server
        .mock("GET", "/history/s1")
        .match_header("authorization", "Bearer stale")
        .with_status(401)
        .expect_at_least(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/history/s1")
        .match_header("authorization", "Bearer new-access")
        .with_status(200)
        .with_body("[]")
        .expect_at_least(1)
        .create_async()
        .await;

    let stack = build_stack(&server.url(), CredentialPair::new("stale", "old-refresh"));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let dispatcher = Arc::clone(&stack.dispatcher);
        handles.push(tokio::spawn(async move {
            dispatcher.dispatch(&ApiRequest::get("/history/s1")).await
        }));
    }
    for handle in handles {
        let response = handle.await.expect("join").expect("dispatch");
        assert_eq!(response.status(), 200);
    }

    refresh.assert_async().await;
    rejected.assert_async().await;
    accepted.assert_async().await;

    // The renewed pair was written through to persisted storage.
    assert_eq!(
        stack.store.load_credentials().await.expect("load"),
        Some(CredentialPair::new("new-access", "new-refresh"))
    );
}

#[tokio::test]
async fn failed_refresh_surfaces_original_401_and_keeps_session() {
    let mut server = mockito::Server::new_async().await;

    let refresh = server
        .mock("POST", "/refresh")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    server.mock("GET", "/history/s1").with_status(401).create_async().await;

    let stack = build_stack(&server.url(), CredentialPair::new("stale", "old-refresh"));
    let response =
        stack.dispatcher.dispatch(&ApiRequest::get("/history/s1")).await.expect("dispatch");

    // The 401 is a value, never an error, and the session survives.
    assert_eq!(response.status(), 401);
    refresh.assert_async().await;
    assert_eq!(stack.store.load_credentials().await.expect("load"), None);

    // A later call can still attempt renewal with the preserved pair.
    let second = server
        .mock("POST", "/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessCredential":"acc-2","refreshCredential":"ref-2"}"#)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/history/s1")
        .match_header("authorization", "Bearer acc-2")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let response =
        stack.dispatcher.dispatch(&ApiRequest::get("/history/s1")).await.expect("dispatch");
    assert_eq!(response.status(), 200);
    second.assert_async().await;
    accepted.assert_async().await;
}
