//! Analysis service
//!
//! Resolves the target account, fetches both users' graphs concurrently
//! and scores the overlap.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::compatibility::{CompatibilityResult, CompatibilityTier, compute_compatibility};
use crate::error::{AppError, Result};
use crate::metrics::{ANALYSES_TOTAL, COMPATIBILITY_SCORE};
use crate::neynar::{EdgeKind, FetchOptions, SocialAccount, SocialGraph, fetch_all_edges};

/// Compatibility report for one caller/target pair
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub target_user: SocialAccount,
    #[serde(flatten)]
    pub compatibility: CompatibilityResult,
    pub tier: CompatibilityTier,
    pub message: &'static str,
}

/// Analysis service
pub struct AnalysisService {
    graph: Arc<dyn SocialGraph>,
    options: FetchOptions,
}

impl AnalysisService {
    /// Create new analysis service
    pub fn new(graph: Arc<dyn SocialGraph>, options: FetchOptions) -> Self {
        Self { graph, options }
    }

    /// Resolve a username, failing with `NotFound` when it does not exist.
    pub async fn find_user(&self, username: &str) -> Result<SocialAccount> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }

        self.graph
            .lookup_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Fetch up to `limit` followers or following of `fid`.
    pub async fn edges(
        &self,
        kind: EdgeKind,
        fid: u64,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<SocialAccount>> {
        fetch_all_edges(self.graph.as_ref(), kind, fid, limit, &self.options, cancel).await
    }

    /// Compare the caller `viewer_fid` with the account named `target_username`.
    ///
    /// # Steps
    /// 1. Resolve the target (no edge requests are made if this fails)
    /// 2. Fetch the four edge lists concurrently
    /// 3. Score the overlap
    ///
    /// # Errors
    /// Any failing step fails the whole analysis; no partial result is produced.
    pub async fn analyze(
        &self,
        viewer_fid: u64,
        target_username: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport> {
        let result = self
            .run(viewer_fid, target_username, limit, cancel)
            .await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(AppError::NotFound(_)) => "not_found",
            Err(AppError::Cancelled) => "cancelled",
            Err(_) => "failure",
        };
        ANALYSES_TOTAL.with_label_values(&[outcome]).inc();

        result
    }

    async fn run(
        &self,
        viewer_fid: u64,
        target_username: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport> {
        if limit == 0 {
            return Err(AppError::Validation(
                "limit must be a positive integer".to_string(),
            ));
        }

        let target = self.find_user(target_username).await?;

        tracing::info!(
            viewer_fid,
            target_fid = target.fid,
            target_username = %target.username,
            limit,
            "Analyzing compatibility"
        );

        // try_join! drops the remaining fetches as soon as one fails.
        let (user_followers, user_following, target_followers, target_following) = tokio::try_join!(
            self.edges(EdgeKind::Followers, viewer_fid, limit, cancel),
            self.edges(EdgeKind::Following, viewer_fid, limit, cancel),
            self.edges(EdgeKind::Followers, target.fid, limit, cancel),
            self.edges(EdgeKind::Following, target.fid, limit, cancel),
        )
        .inspect_err(|error| {
            tracing::error!(
                viewer_fid,
                target_fid = target.fid,
                %error,
                "Compatibility analysis failed"
            );
        })?;

        let compatibility = compute_compatibility(
            &user_followers,
            &user_following,
            &target_followers,
            &target_following,
        );
        COMPATIBILITY_SCORE.observe(f64::from(compatibility.score));

        let tier = CompatibilityTier::from_score(compatibility.score);
        tracing::info!(
            viewer_fid,
            target_fid = target.fid,
            score = compatibility.score,
            "Compatibility analysis completed"
        );

        Ok(AnalysisReport {
            target_user: target,
            compatibility,
            tier,
            message: tier.message(),
        })
    }
}
