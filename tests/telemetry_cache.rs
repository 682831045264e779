//! Integration tests for the telemetry cache over the authenticated HTTP
//! stack.

use std::{sync::Arc, time::Duration};

use sitewatch::{
    auth::{AuthDispatcher, RefreshCoordinator, SessionStore},
    cache::TelemetryCache,
    config::HttpRetryConfig,
    http_client::create_retryable_http_client,
    models::{CacheKey, CredentialPair},
    persistence::FilePreferenceStore,
    providers::HttpTelemetrySource,
    test_helpers::SampleBuilder,
};
use url::Url;

struct Stack {
    cache: Arc<TelemetryCache>,
    _dir: tempfile::TempDir,
}

fn build_stack(server_url: &str) -> Stack {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FilePreferenceStore::new(dir.path().join("preferences.json")));
    let session =
        Arc::new(SessionStore::from_pair(Some(CredentialPair::new("valid", "refresh"))));
    let retry = HttpRetryConfig { max_retries: 0, ..HttpRetryConfig::default() };
    let client = Arc::new(create_retryable_http_client(&retry).expect("client"));
    let base_url = Url::parse(server_url).expect("server url");
    let exchange = Arc::new(sitewatch::providers::HttpAuthExchange::new(
        base_url.clone(),
        client.clone(),
    ));
    let coordinator = Arc::new(RefreshCoordinator::new(
        Arc::clone(&session),
        exchange,
        store,
        Duration::from_secs(5),
    ));
    let dispatcher = Arc::new(AuthDispatcher::new(base_url, client, session, coordinator));
    let source = Arc::new(HttpTelemetrySource::new(dispatcher));
    Stack { cache: Arc::new(TelemetryCache::new(source, Duration::from_secs(60))), _dir: dir }
}

async fn wait_for_entry(cache: &Arc<TelemetryCache>, key: &CacheKey) {
    for _ in 0..100 {
        if cache.get_entry(key).is_some() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("entry for {key} never appeared");
}

#[tokio::test]
async fn two_windows_for_one_site_fetch_independently() {
    let mut server = mockito::Server::new_async().await;
    let twelve = server
        .mock("GET", "/history/s1")
        .match_query(mockito::Matcher::UrlEncoded("hours".into(), "12".into()))
        .with_status(200)
        .with_body(
            serde_json::json!([SampleBuilder::at("2026-08-29T09:00:00Z")
                .latency(12.0)
                .packet_loss(0.0)
                .build()])
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let day = server
        .mock("GET", "/history/s1")
        .match_query(mockito::Matcher::UrlEncoded("hours".into(), "24".into()))
        .with_status(200)
        .with_body(
            serde_json::json!([SampleBuilder::at("2026-08-29T08:00:00Z")
                .latency(15.0)
                .packet_loss(1.0)
                .build()])
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let stack = build_stack(&server.url());
    let k12 = CacheKey::new("s1", 12).expect("key");
    let k24 = CacheKey::new("s1", 24).expect("key");

    stack.cache.ensure_fresh(&k12, false);
    stack.cache.ensure_fresh(&k24, false);
    wait_for_entry(&stack.cache, &k12).await;
    wait_for_entry(&stack.cache, &k24).await;

    // Two independent entries, two network calls.
    let e12 = stack.cache.get_entry(&k12).expect("12h entry");
    let e24 = stack.cache.get_entry(&k24).expect("24h entry");
    assert_eq!(e12.samples[0].latency, Some(12.0));
    assert_eq!(e24.samples[0].latency, Some(15.0));
    twelve.assert_async().await;
    day.assert_async().await;

    // Both entries are fresh now: a repeat is suppressed entirely.
    stack.cache.ensure_fresh(&k12, false);
    stack.cache.ensure_fresh(&k24, false);
    tokio::time::sleep(Duration::from_millis(50)).await;
    twelve.assert_async().await;
    day.assert_async().await;
}

#[tokio::test]
async fn malformed_samples_are_dropped_during_ingestion() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/history/s1")
        .match_query(mockito::Matcher::UrlEncoded("hours".into(), "6".into()))
        .with_status(200)
        .with_body(
            serde_json::json!([
                SampleBuilder::at("2026-08-29T09:05:00Z").packet_loss(100.0).build(),
                { "latency": 3.0 },
                SampleBuilder::at("2026-08-29T09:00:00Z").packet_loss(0.0).build(),
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let stack = build_stack(&server.url());
    let key = CacheKey::new("s1", 6).expect("key");
    stack.cache.fetch_now(&key).await;

    let entry = stack.cache.get_entry(&key).expect("entry");
    assert!(entry.error.is_none());
    assert_eq!(entry.samples.len(), 2);
    // Sorted ascending, reachability derived at ingestion.
    assert_eq!(entry.samples[0].is_reachable, Some(true));
    assert_eq!(entry.samples[1].is_reachable, Some(false));
}

#[tokio::test]
async fn failing_endpoint_is_recorded_as_entry_data() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("GET", "/history/s1")
        .match_query(mockito::Matcher::UrlEncoded("hours".into(), "1".into()))
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let stack = build_stack(&server.url());
    let key = CacheKey::new("s1", 1).expect("key");
    stack.cache.fetch_now(&key).await;

    let entry = stack.cache.get_entry(&key).expect("entry");
    assert!(entry.samples.is_empty());
    assert!(entry.error.is_some());

    // Failure still counts as freshly checked; no immediate hammering.
    stack.cache.ensure_fresh(&key, false);
    tokio::time::sleep(Duration::from_millis(50)).await;
    failing.assert_async().await;
}
