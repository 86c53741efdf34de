//! Compatibility endpoint
//!
//! - GET /api/compatibility?fid=&username=&limit=

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
use crate::service::AnalysisReport;

/// Create compatibility router
pub fn compatibility_router() -> Router<AppState> {
    Router::new().route("/compatibility", get(compatibility))
}

#[derive(Debug, Deserialize)]
struct CompatibilityQuery {
    /// Caller's FID, supplied by the sign-in layer
    fid: Option<String>,
    /// Target username
    username: Option<String>,
    limit: Option<String>,
}

/// GET /api/compatibility
///
/// Compares the caller's followers/following with the target's.
async fn compatibility(
    State(state): State<AppState>,
    Query(query): Query<CompatibilityQuery>,
) -> Result<Json<AnalysisReport>, AppError> {
    let viewer_fid = parse_fid(query.fid.as_deref())?;
    let username = required_text(query.username.as_deref(), "Username is required")?;
    let limit = parse_limit(query.limit.as_deref(), &state.config.analysis)?;

    let cancel = state.shutdown.child_token();
    let report = state
        .analysis
        .analyze(viewer_fid, username, limit, &cancel)
        .await
        .map_err(|e| e.during("Failed to analyze compatibility"))?;

    Ok(Json(report))
}
