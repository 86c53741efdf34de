//! Neynar proxy endpoints
//!
//! Keep the API key on the server while the UI reads the social graph.
//!
//! - GET /api/neynar/search?username=
//! - GET /api/neynar/followers?fid=&limit=
//! - GET /api/neynar/following?fid=&limit=

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;

use super::params::{parse_fid, parse_limit, required_text};
use crate::AppState;
use crate::error::AppError;
use crate::neynar::{EdgeKind, SocialAccount};

/// Create Neynar proxy router
///
/// Routes:
/// - GET /neynar/search
/// - GET /neynar/followers
/// - GET /neynar/following
pub fn neynar_router() -> Router<AppState> {
    Router::new()
        .route("/neynar/search", get(search))
        .route("/neynar/followers", get(followers))
        .route("/neynar/following", get(following))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EdgeQuery {
    fid: Option<String>,
    limit: Option<String>,
}

/// GET /api/neynar/search
///
/// Resolves a username to a single account.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SocialAccount>, AppError> {
    let username = required_text(query.username.as_deref(), "Username is required")?;

    let account = state
        .analysis
        .find_user(username)
        .await
        .map_err(|e| e.during("Failed to fetch user"))?;

    Ok(Json(account))
}

/// GET /api/neynar/followers
async fn followers(
    State(state): State<AppState>,
    Query(query): Query<EdgeQuery>,
) -> Result<Json<Vec<SocialAccount>>, AppError> {
    list_edges(&state, query, EdgeKind::Followers).await
}

/// GET /api/neynar/following
async fn following(
    State(state): State<AppState>,
    Query(query): Query<EdgeQuery>,
) -> Result<Json<Vec<SocialAccount>>, AppError> {
    list_edges(&state, query, EdgeKind::Following).await
}

async fn list_edges(
    state: &AppState,
    query: EdgeQuery,
    kind: EdgeKind,
) -> Result<Json<Vec<SocialAccount>>, AppError> {
    let fid = parse_fid(query.fid.as_deref())?;
    let limit = parse_limit(query.limit.as_deref(), &state.config.analysis)?;

    let cancel = state.shutdown.child_token();
    let accounts = state
        .analysis
        .edges(kind, fid, limit, &cancel)
        .await
        .map_err(|e| e.during(&format!("Failed to fetch {kind}")))?;

    Ok(Json(accounts))
}
