//! Neynar wire schemas and the normalized account model
//!
//! Upstream payloads are decoded into strict structs at the boundary;
//! the rest of the crate only sees `SocialAccount` and `EdgePage`.

use serde::{Deserialize, Serialize};

/// Normalized Farcaster account
///
/// Immutable snapshot taken for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialAccount {
    pub fid: u64,
    pub username: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp_url: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
}

/// Which side of the social graph to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Followers,
    Following,
}

impl EdgeKind {
    /// Upstream path segment and metric label
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Followers => "followers",
            EdgeKind::Following => "following",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of edges plus the cursor for the next page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgePage {
    pub accounts: Vec<SocialAccount>,
    pub next_cursor: Option<String>,
}

/// User object as returned by Neynar
#[derive(Debug, Clone, Deserialize)]
pub struct NeynarUser {
    pub fid: u64,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub pfp_url: Option<String>,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub following_count: u64,
}

impl From<NeynarUser> for SocialAccount {
    fn from(user: NeynarUser) -> Self {
        Self {
            fid: user.fid,
            username: user.username,
            display_name: user.display_name.unwrap_or_default(),
            pfp_url: user.pfp_url.filter(|url| !url.is_empty()),
            follower_count: user.follower_count,
            following_count: user.following_count,
        }
    }
}

/// `GET /user/by_username` response
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    #[serde(default)]
    pub user: Option<NeynarUser>,
}

/// `GET /followers` and `GET /following` response
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeListEnvelope {
    pub users: Vec<EdgeItem>,
    #[serde(default)]
    pub next: Option<NextCursor>,
}

/// A single follower/following entry wrapping the related user
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeItem {
    pub user: NeynarUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NextCursor {
    #[serde(default)]
    pub cursor: Option<String>,
}

impl From<EdgeListEnvelope> for EdgePage {
    fn from(envelope: EdgeListEnvelope) -> Self {
        let next_cursor = envelope
            .next
            .and_then(|next| next.cursor)
            .filter(|cursor| !cursor.is_empty());

        Self {
            accounts: envelope
                .users
                .into_iter()
                .map(|item| SocialAccount::from(item.user))
                .collect(),
            next_cursor,
        }
    }
}
