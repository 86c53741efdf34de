//! Bulk edge fetching
//!
//! Walks the cursor chain of a followers/following listing until the
//! requested number of accounts is collected or the upstream runs out.

use std::collections::HashSet;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::client::SocialGraph;
use super::types::{EdgeKind, SocialAccount};
use crate::config::{MAX_PAGE_SIZE, NeynarConfig};
use crate::error::{AppError, Result};
use crate::metrics::EDGES_FETCHED_TOTAL;

/// Default number of accounts fetched per list
pub const DEFAULT_MAX_COUNT: usize = 1000;

/// Pagination settings
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Records requested per page, never above 100
    pub page_size: u32,
    /// Pause between successive page requests
    pub page_delay: Duration,
    /// Skip accounts whose fid was already collected
    pub dedupe: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            page_delay: Duration::from_millis(100),
            dedupe: true,
        }
    }
}

impl FetchOptions {
    pub fn from_config(config: &NeynarConfig) -> Self {
        Self {
            page_size: config.page_size,
            page_delay: config.page_delay(),
            dedupe: config.dedupe_edges,
        }
    }

    fn page_cap(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE) as usize
    }
}

/// Fetch up to `max_count` followers or following of `fid`.
///
/// Pages are requested strictly in sequence because each cursor comes from
/// the previous response. Accounts keep upstream order. The first failing
/// page aborts the whole fetch and no partial result is returned.
///
/// # Errors
/// * `Cancelled` if `cancel` fires before the last page arrives
/// * Any error from `SocialGraph::fetch_edge_page`
pub async fn fetch_all_edges<G>(
    graph: &G,
    kind: EdgeKind,
    fid: u64,
    max_count: usize,
    options: &FetchOptions,
    cancel: &CancellationToken,
) -> Result<Vec<SocialAccount>>
where
    G: SocialGraph + ?Sized,
{
    let page_cap = options.page_cap();
    let mut accounts: Vec<SocialAccount> = Vec::with_capacity(max_count.min(page_cap));
    let mut seen: HashSet<u64> = HashSet::new();
    let mut cursor: Option<String> = None;
    let mut page: u32 = 0;

    tracing::info!(fid, %kind, max_count, "Fetching edges");

    while accounts.len() < max_count {
        let limit = page_cap.min(max_count - accounts.len());
        page += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            result = graph.fetch_edge_page(kind, fid, limit as u32, cursor.take()) => result,
        };
        let edge_page = result.inspect_err(|error| {
            tracing::error!(fid, %kind, page, %error, "Edge page request failed");
        })?;

        let returned = edge_page.accounts.len();
        for account in edge_page.accounts {
            if accounts.len() >= max_count {
                break;
            }
            if options.dedupe && !seen.insert(account.fid) {
                continue;
            }
            accounts.push(account);
        }

        tracing::debug!(
            fid,
            %kind,
            page,
            returned,
            total = accounts.len(),
            "Fetched edge page"
        );

        // An empty page with a cursor would otherwise loop forever.
        match edge_page.next_cursor {
            Some(next) if returned > 0 && accounts.len() < max_count => cursor = Some(next),
            _ => break,
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            _ = tokio::time::sleep(options.page_delay) => {}
        }
    }

    EDGES_FETCHED_TOTAL
        .with_label_values(&[kind.as_str()])
        .inc_by(accounts.len() as u64);
    tracing::info!(fid, %kind, pages = page, total = accounts.len(), "Fetched all edges");

    Ok(accounts)
}
