//! E2E tests for the compatibility endpoint

mod common;

use common::{FakeNeynar, TEST_API_KEY, TestServer};
use serde_json::Value;

fn fids(list: &Value) -> Vec<u64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|account| account["fid"].as_u64().unwrap())
        .collect()
}

fn scenario() -> FakeNeynar {
    // Caller is fid 100, target "target" is fid 200.
    FakeNeynar::default()
        .with_user("target", 200)
        .with_followers(100, [5, 6])
        .with_following(100, [1, 2, 3])
        .with_followers(200, [6, 7])
        .with_following(200, [2, 3, 4])
}

#[tokio::test]
async fn test_compatibility_scores_overlap() {
    let server = TestServer::with_upstream(scenario(), Some(TEST_API_KEY)).await;

    let (status, body) = server
        .get_json("/api/compatibility?fid=100&username=target")
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["score"], 62);
    assert_eq!(body["tier"], "great");
    assert_eq!(body["message"], "Great Compatibility");
    assert_eq!(body["targetUser"]["fid"], 200);
    assert_eq!(fids(&body["commonFollowing"]), vec![2, 3]);
    assert_eq!(fids(&body["commonFollowers"]), vec![6]);
    assert_eq!(body["details"]["followingOverlap"], 67);
    assert_eq!(body["details"]["followerOverlap"], 50);
    assert_eq!(body["details"]["totalUserConnections"], 5);
    assert_eq!(body["details"]["totalTargetConnections"], 5);
}

#[tokio::test]
async fn test_compatibility_without_overlap() {
    let upstream = FakeNeynar::default()
        .with_user("stranger", 300)
        .with_followers(100, [1])
        .with_following(100, [2])
        .with_followers(300, [3])
        .with_following(300, [4]);
    let server = TestServer::with_upstream(upstream, Some(TEST_API_KEY)).await;

    let (status, body) = server
        .get_json("/api/compatibility?fid=100&username=stranger")
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["score"], 0);
    assert_eq!(body["commonFollowers"], Value::Array(vec![]));
    assert_eq!(body["commonFollowing"], Value::Array(vec![]));
    assert_eq!(body["message"], "Different Circles");
}

#[tokio::test]
async fn test_unknown_target_skips_edge_fetches() {
    let server = TestServer::with_upstream(scenario(), Some(TEST_API_KEY)).await;

    let (status, body) = server
        .get_json("/api/compatibility?fid=100&username=nobody")
        .await;

    assert_eq!(status, 404);
    assert_eq!(body["error"], "User not found");
    assert_eq!(
        server.upstream.requests(),
        vec!["user/by_username?username=nobody"]
    );
}

#[tokio::test]
async fn test_failed_edge_fetch_fails_analysis() {
    let server = TestServer::with_upstream(scenario().failing_for(200), Some(TEST_API_KEY)).await;

    let (status, body) = server
        .get_json("/api/compatibility?fid=100&username=target")
        .await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to analyze compatibility");
    assert!(body.get("score").is_none());
}

#[tokio::test]
async fn test_compatibility_requires_parameters() {
    let server = TestServer::with_upstream(scenario(), Some(TEST_API_KEY)).await;

    let (status, body) = server.get_json("/api/compatibility?username=target").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "FID is required");

    let (status, body) = server.get_json("/api/compatibility?fid=100").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Username is required");

    assert!(server.upstream.requests().is_empty());
}

#[tokio::test]
async fn test_shutdown_cancels_analysis() {
    let server = TestServer::with_upstream(scenario(), Some(TEST_API_KEY)).await;
    server.state.shutdown.cancel();

    let (status, body) = server
        .get_json("/api/compatibility?fid=100&username=target")
        .await;

    assert_eq!(status, 503);
    assert_eq!(body["error"], "Request cancelled");
}
