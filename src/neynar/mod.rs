//! Neynar (Farcaster) upstream module
//!
//! Handles:
//! - Wire schemas for Neynar responses
//! - User lookup by username
//! - Cursor pagination over followers/following

mod client;
mod pagination;
mod types;

#[cfg(test)]
pub use client::MockSocialGraph;
pub use client::{NeynarClient, SocialGraph};
pub use pagination::{DEFAULT_MAX_COUNT, FetchOptions, fetch_all_edges};
pub use types::{
    EdgeItem, EdgeKind, EdgeListEnvelope, EdgePage, NeynarUser, NextCursor, SocialAccount,
    UserEnvelope,
};
