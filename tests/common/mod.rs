//! Common test utilities for E2E tests
//!
//! Starts the Farmix router on an ephemeral port next to a fake Neynar API.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use farmix::{AppState, config};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const TEST_API_KEY: &str = "test-api-key";

/// In-memory stand-in for the Neynar API
#[derive(Default)]
pub struct FakeNeynar {
    /// username -> fid
    pub users: HashMap<String, u64>,
    pub followers: HashMap<u64, Vec<u64>>,
    pub following: HashMap<u64, Vec<u64>>,
    /// Listing requests for these fids fail with HTTP 500
    pub failing_fids: HashSet<u64>,
    /// Lookups for these usernames answer 200 without a `user` field
    pub empty_lookups: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl FakeNeynar {
    pub fn with_user(mut self, username: &str, fid: u64) -> Self {
        self.users.insert(username.to_string(), fid);
        self
    }

    pub fn with_followers(mut self, fid: u64, followers: impl IntoIterator<Item = u64>) -> Self {
        self.followers.insert(fid, followers.into_iter().collect());
        self
    }

    pub fn with_following(mut self, fid: u64, following: impl IntoIterator<Item = u64>) -> Self {
        self.following.insert(fid, following.into_iter().collect());
        self
    }

    pub fn failing_for(mut self, fid: u64) -> Self {
        self.failing_fids.insert(fid);
        self
    }

    pub fn empty_lookup_for(mut self, username: &str) -> Self {
        self.empty_lookups.insert(username.to_string());
        self
    }

    /// Request paths with query strings, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.requests.lock().unwrap().push(entry);
    }
}

fn user_json(fid: u64) -> Value {
    json!({
        "object": "user",
        "fid": fid,
        "username": format!("user{fid}"),
        "display_name": format!("User {fid}"),
        "pfp_url": format!("https://example.com/{fid}.png"),
        "follower_count": fid * 10,
        "following_count": fid * 2,
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == TEST_API_KEY)
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    username: String,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    fid: u64,
    limit: usize,
    cursor: Option<String>,
}

async fn fake_user(
    State(fake): State<Arc<FakeNeynar>>,
    headers: HeaderMap,
    Query(query): Query<UserQuery>,
) -> Response {
    fake.record(format!("user/by_username?username={}", query.username));
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "bad key").into_response();
    }

    if fake.empty_lookups.contains(&query.username) {
        return Json(json!({})).into_response();
    }

    match fake.users.get(&query.username) {
        Some(fid) => Json(json!({ "user": user_json(*fid) })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "User not found" })),
        )
            .into_response(),
    }
}

fn fake_list(
    fake: &FakeNeynar,
    headers: &HeaderMap,
    kind: &str,
    lists: &HashMap<u64, Vec<u64>>,
    query: ListQuery,
) -> Response {
    fake.record(format!(
        "{kind}?fid={}&limit={}&cursor={}",
        query.fid,
        query.limit,
        query.cursor.as_deref().unwrap_or("")
    ));
    if !authorized(headers) {
        return (StatusCode::UNAUTHORIZED, "bad key").into_response();
    }
    if fake.failing_fids.contains(&query.fid) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    if query.limit > 100 {
        return (StatusCode::BAD_REQUEST, "limit too large").into_response();
    }

    let all = lists.get(&query.fid).cloned().unwrap_or_default();
    let start: usize = query
        .cursor
        .as_deref()
        .map(|cursor| cursor.parse().unwrap())
        .unwrap_or(0);
    let end = (start + query.limit).min(all.len());
    let users: Vec<Value> = all[start..end]
        .iter()
        .map(|fid| json!({ "object": kind, "user": user_json(*fid) }))
        .collect();
    let cursor = (end < all.len()).then(|| end.to_string());

    Json(json!({ "users": users, "next": { "cursor": cursor } })).into_response()
}

async fn fake_followers(
    State(fake): State<Arc<FakeNeynar>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    fake_list(&fake, &headers, "followers", &fake.followers, query)
}

async fn fake_following(
    State(fake): State<Arc<FakeNeynar>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    fake_list(&fake, &headers, "following", &fake.following, query)
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub upstream: Arc<FakeNeynar>,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a test server backed by an empty fake upstream
    pub async fn new() -> Self {
        Self::with_upstream(FakeNeynar::default(), Some(TEST_API_KEY)).await
    }

    /// Create a test server backed by `upstream`
    pub async fn with_upstream(upstream: FakeNeynar, api_key: Option<&str>) -> Self {
        let upstream = Arc::new(upstream);
        let upstream_app = Router::new()
            .route("/v2/farcaster/user/by_username", get(fake_user))
            .route("/v2/farcaster/followers", get(fake_followers))
            .route("/v2/farcaster/following", get(fake_following))
            .with_state(upstream.clone());
        let upstream_addr = spawn(upstream_app).await;

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                allowed_origin: Some("https://farmix.example.com".to_string()),
            },
            neynar: config::NeynarConfig {
                base_url: format!("{upstream_addr}/v2/farcaster"),
                api_key: api_key.map(str::to_string),
                request_timeout_seconds: 10,
                page_size: 100,
                page_delay_ms: 0,
                dedupe_edges: true,
            },
            analysis: config::AnalysisConfig {
                default_limit: 1000,
                max_limit: 5000,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        let state = AppState::new(config).unwrap();
        let addr = spawn(farmix::build_router(state.clone())).await;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            addr,
            state,
            upstream,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status().as_u16();
        let body = response.json().await.unwrap();
        (status, body)
    }
}
