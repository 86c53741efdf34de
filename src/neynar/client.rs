//! Neynar REST client
//!
//! Read-only access to the three endpoints Farmix needs:
//! user lookup by username, followers and following.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{EdgeKind, EdgeListEnvelope, EdgePage, SocialAccount, UserEnvelope};
use crate::config::NeynarConfig;
use crate::error::{AppError, Result};
use crate::metrics::{UPSTREAM_REQUEST_DURATION_SECONDS, UPSTREAM_REQUESTS_TOTAL};

const API_KEY_HEADER: &str = "x-api-key";

/// Read access to a social graph
///
/// Implemented by `NeynarClient`; mocked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// Resolve a username to an account.
    ///
    /// Returns `Ok(None)` when the username does not exist.
    async fn lookup_by_username(&self, username: &str) -> Result<Option<SocialAccount>>;

    /// Fetch one page of followers or following.
    async fn fetch_edge_page(
        &self,
        kind: EdgeKind,
        fid: u64,
        limit: u32,
        cursor: Option<String>,
    ) -> Result<EdgePage>;
}

/// HTTP client for the Neynar Farcaster API
#[derive(Clone)]
pub struct NeynarClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl NeynarClient {
    /// Create new client
    ///
    /// # Arguments
    /// * `config` - Base URL and API key
    /// * `http` - Shared HTTP client (timeouts are configured on it)
    pub fn new(config: &NeynarConfig, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("neynar.base_url is invalid: {e}")))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Whether an API key is available
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config("neynar.base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(path.split('/'));
        Ok(url)
    }

    fn user_url(&self, username: &str) -> Result<Url> {
        let mut url = self.endpoint("user/by_username")?;
        url.query_pairs_mut().append_pair("username", username);
        Ok(url)
    }

    fn edge_url(&self, kind: EdgeKind, fid: u64, limit: u32, cursor: Option<&str>) -> Result<Url> {
        let mut url = self.endpoint(kind.as_str())?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("fid", &fid.to_string())
                .append_pair("limit", &limit.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }
        Ok(url)
    }

    /// Issue a GET and return status plus raw body.
    ///
    /// Fails with `CredentialMissing` before any network I/O when no key is set.
    async fn get(&self, endpoint: &'static str, url: Url) -> Result<(StatusCode, String)> {
        let api_key = self.api_key.as_deref().ok_or(AppError::CredentialMissing)?;

        tracing::debug!(endpoint, url = %url, "Requesting Neynar");

        let timer = UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&[endpoint])
            .start_timer();
        let result = self
            .http
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await;
        timer.observe_duration();

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[endpoint, "error"])
                    .inc();
                tracing::error!(endpoint, %error, "Neynar request failed");
                return Err(error.into());
            }
        };

        let status = response.status();
        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&[endpoint, status.as_str()])
            .inc();

        let body = response.text().await?;
        Ok((status, body))
    }

    fn upstream_error(endpoint: &'static str, status: StatusCode, body: String) -> AppError {
        tracing::error!(
            endpoint,
            status = status.as_u16(),
            body = %body,
            "Neynar API error"
        );
        AppError::Upstream {
            status: status.as_u16(),
            body,
        }
    }
}

fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(endpoint, error = %e, "Unexpected Neynar response shape");
        AppError::Decode(format!("{endpoint}: {e}"))
    })
}

#[async_trait]
impl SocialGraph for NeynarClient {
    async fn lookup_by_username(&self, username: &str) -> Result<Option<SocialAccount>> {
        const ENDPOINT: &str = "user_by_username";

        let url = self.user_url(username)?;
        let (status, body) = self.get(ENDPOINT, url).await?;

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(username, "Username not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::upstream_error(ENDPOINT, status, body));
        }

        let envelope: UserEnvelope = decode(ENDPOINT, &body)?;
        Ok(envelope.user.map(SocialAccount::from))
    }

    async fn fetch_edge_page(
        &self,
        kind: EdgeKind,
        fid: u64,
        limit: u32,
        cursor: Option<String>,
    ) -> Result<EdgePage> {
        let endpoint = kind.as_str();
        let url = self.edge_url(kind, fid, limit, cursor.as_deref())?;
        let (status, body) = self.get(endpoint, url).await?;

        if !status.is_success() {
            return Err(Self::upstream_error(endpoint, status, body));
        }

        let envelope: EdgeListEnvelope = decode(endpoint, &body)?;
        Ok(envelope.into())
    }
}
