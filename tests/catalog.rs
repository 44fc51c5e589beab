//! Integration tests for the catalog loader over a scripted transport.

use anime_tournament_web::catalog::{
    load_completed_entries, resolve_posters, CatalogError, Delay, RawResponse, RetryPolicy,
    ShikimoriClient, Transport, PAGE_SIZE,
};
use anime_tournament_web::storage::{cache_poster, cached_poster, MemoryStore};
use anime_tournament_web::{Entry, TargetType};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

/// Replays canned responses in order and records request bodies.
#[derive(Default)]
struct ScriptedTransport {
    responses: RefCell<VecDeque<RawResponse>>,
    requests: RefCell<Vec<Value>>,
}

impl ScriptedTransport {
    fn push(&self, status: u16, body: Value) {
        self.responses.borrow_mut().push_back(RawResponse {
            status,
            body: body.to_string(),
        });
    }
}

impl Transport for ScriptedTransport {
    async fn post_json(&self, body: &Value) -> Result<RawResponse, CatalogError> {
        self.requests.borrow_mut().push(body.clone());
        Ok(self
            .responses
            .borrow_mut()
            .pop_front()
            .expect("unexpected request"))
    }
}

#[derive(Default)]
struct RecordingDelay {
    waits: RefCell<Vec<Duration>>,
}

impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.borrow_mut().push(duration);
    }
}

fn client(retry: RetryPolicy) -> ShikimoriClient<ScriptedTransport, RecordingDelay> {
    ShikimoriClient::new(ScriptedTransport::default(), RecordingDelay::default(), retry)
}

fn user(id: &str) -> Value {
    json!({ "data": { "users": [{ "id": id }] } })
}

fn rate(n: usize, status: &str) -> Value {
    json!({
        "id": format!("r{n}"),
        "score": (n % 10) as i32,
        "status": status,
        "anime": {
            "id": n.to_string(),
            "name": format!("Title {n}"),
            "url": format!("/animes/{n}"),
            "poster": { "miniUrl": format!("https://img/mini/{n}.jpg") }
        }
    })
}

fn page(rows: Vec<Value>) -> Value {
    json!({ "data": { "userRates": rows } })
}

#[tokio::test]
async fn pages_until_short_page_and_keeps_completed() {
    let c = client(RetryPolicy::default());
    let t = c.transport();
    t.push(200, user("77"));
    t.push(200, page((0..PAGE_SIZE).map(|n| rate(n, "completed")).collect()));
    t.push(
        200,
        page(vec![rate(100, "completed"), rate(101, "watching"), rate(102, "dropped")]),
    );

    let entries = load_completed_entries(&c, "someone", TargetType::Anime)
        .await
        .unwrap();
    assert_eq!(entries.len(), PAGE_SIZE + 1);
    assert_eq!(
        entries[0],
        Entry {
            title: "Title 0".into(),
            external_id: "0".into(),
            permalink: "/animes/0".into(),
            poster_url: Some("https://img/mini/0.jpg".into()),
            base_score: 0,
        }
    );
    assert_eq!(entries.last().unwrap().title, "Title 100");

    let requests = t.requests.borrow();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0]["variables"]["search"], "someone");
    assert_eq!(requests[1]["variables"]["userId"], "77");
    assert_eq!(requests[1]["variables"]["page"], 1);
    assert_eq!(requests[2]["variables"]["page"], 2);
    assert_eq!(requests[2]["variables"]["limit"], PAGE_SIZE);
}

#[tokio::test]
async fn unknown_user_is_reported() {
    let c = client(RetryPolicy::default());
    c.transport()
        .push(200, json!({ "data": { "users": [] } }));
    let err = load_completed_entries(&c, "nobody", TargetType::Anime)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::UserNotFound(ref name) if name == "nobody"));
    assert_eq!(
        err.user_message(TargetType::Anime),
        "User not found. Please check the username."
    );
}

#[tokio::test]
async fn provider_failure_commits_nothing() {
    let c = client(RetryPolicy::default());
    let t = c.transport();
    t.push(200, user("77"));
    t.push(200, page((0..PAGE_SIZE).map(|n| rate(n, "completed")).collect()));
    t.push(500, json!({ "message": "boom" }));
    let err = load_completed_entries(&c, "someone", TargetType::Manga)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Status { status: 500, .. }));
    assert_eq!(err.user_message(TargetType::Manga), "Error fetching manga list.");
}

#[tokio::test]
async fn graphql_errors_are_surfaced() {
    let c = client(RetryPolicy::default());
    c.transport().push(
        200,
        json!({ "data": null, "errors": [{ "message": "bad query" }] }),
    );
    let err = c.find_user_id("someone").await.unwrap_err();
    assert!(matches!(err, CatalogError::Graphql(ref m) if m == "bad query"));
}

#[tokio::test]
async fn rate_limit_is_retried_after_backoff() {
    let retry = RetryPolicy {
        backoff: Duration::from_millis(2000),
        max_retries: None,
    };
    let c = client(retry);
    let t = c.transport();
    t.push(429, json!({}));
    t.push(429, json!({}));
    t.push(200, user("5"));

    assert_eq!(c.find_user_id("someone").await.unwrap().as_deref(), Some("5"));
    assert_eq!(t.requests.borrow().len(), 3);
    assert_eq!(
        *c.delay().waits.borrow(),
        vec![Duration::from_millis(2000); 2]
    );
}

#[tokio::test]
async fn rate_limit_gives_up_at_cap() {
    let retry = RetryPolicy {
        backoff: Duration::from_millis(10),
        max_retries: Some(1),
    };
    let c = client(retry);
    let t = c.transport();
    t.push(429, json!({}));
    t.push(429, json!({}));

    let err = c.find_user_id("someone").await.unwrap_err();
    assert!(matches!(err, CatalogError::RateLimited { attempts: 2 }));
    assert_eq!(c.delay().waits.borrow().len(), 1);
}

#[tokio::test]
async fn posters_use_cache_then_provider() {
    let store = MemoryStore::new();
    cache_poster(&store, "anime", "1", "https://img/cached/1.jpg").unwrap();

    let c = client(RetryPolicy::default());
    let t = c.transport();
    t.push(
        200,
        json!({ "data": { "animes": [{ "poster": { "originalUrl": "https://img/orig/2.jpg", "mainUrl": "https://img/main/2.jpg" } }] } }),
    );
    t.push(500, json!({}));

    let entries = vec![
        Entry::new("One", "1", 1),
        Entry::new("Two", "2", 2),
        Entry::new("Three", "3", 3),
    ];
    let found = resolve_posters(&c, &store, TargetType::Anime, &entries).await;

    assert_eq!(found.len(), 2);
    assert_eq!(found["1"], "https://img/cached/1.jpg");
    assert_eq!(found["2"], "https://img/orig/2.jpg");
    assert_eq!(
        cached_poster(&store, "anime", "2").as_deref(),
        Some("https://img/orig/2.jpg")
    );
    assert_eq!(t.requests.borrow().len(), 2);
}
