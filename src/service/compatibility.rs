//! Compatibility scoring
//!
//! Pure set-overlap math over two users' follower/following lists.

use std::collections::HashSet;

use serde::Serialize;

use crate::neynar::SocialAccount;

/// Weight of the following overlap in the blended score
const FOLLOWING_WEIGHT: f64 = 0.7;
/// Weight of the follower overlap in the blended score
const FOLLOWER_WEIGHT: f64 = 0.3;
const MAX_SCORE: u8 = 100;

/// Result of comparing the caller's graph with the target's
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    /// Blended score in 0..=100
    pub score: u8,
    /// Caller's followers who also follow the target, in caller order
    pub common_followers: Vec<SocialAccount>,
    /// Accounts both users follow, in caller order
    pub common_following: Vec<SocialAccount>,
    pub details: CompatibilityDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityDetails {
    /// Rounded percentage of the caller's followers shared with the target
    pub follower_overlap: u8,
    /// Rounded percentage of the caller's following shared with the target
    pub following_overlap: u8,
    pub total_user_connections: usize,
    pub total_target_connections: usize,
}

/// Score band shown alongside the number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityTier {
    PerfectMatch,
    Great,
    Good,
    SomeOverlap,
    DifferentCircles,
}

impl CompatibilityTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::PerfectMatch,
            60..=79 => Self::Great,
            40..=59 => Self::Good,
            20..=39 => Self::SomeOverlap,
            _ => Self::DifferentCircles,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::PerfectMatch => "Perfect Match!",
            Self::Great => "Great Compatibility",
            Self::Good => "Good Connection",
            Self::SomeOverlap => "Some Overlap",
            Self::DifferentCircles => "Different Circles",
        }
    }
}

/// Members of `own` whose fid also appears in `other`, keeping `own` order.
///
/// Membership is by fid only; the returned records are the copies from `own`.
fn common_accounts(own: &[SocialAccount], other: &[SocialAccount]) -> Vec<SocialAccount> {
    let other_fids: HashSet<u64> = other.iter().map(|account| account.fid).collect();
    own.iter()
        .filter(|account| other_fids.contains(&account.fid))
        .cloned()
        .collect()
}

fn overlap_percent(common: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    common as f64 / total as f64 * 100.0
}

/// Round half-up to an integer percentage in 0..=100.
fn round_percent(value: f64) -> u8 {
    value.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}

/// Compare the caller's graph with the target's.
///
/// The score blends the *unrounded* overlaps (70% following, 30% followers)
/// and rounds once; the detail percentages are rounded independently.
pub fn compute_compatibility(
    user_followers: &[SocialAccount],
    user_following: &[SocialAccount],
    target_followers: &[SocialAccount],
    target_following: &[SocialAccount],
) -> CompatibilityResult {
    let common_followers = common_accounts(user_followers, target_followers);
    let common_following = common_accounts(user_following, target_following);

    let follower_overlap = overlap_percent(common_followers.len(), user_followers.len());
    let following_overlap = overlap_percent(common_following.len(), user_following.len());

    let blended = following_overlap * FOLLOWING_WEIGHT + follower_overlap * FOLLOWER_WEIGHT;
    let score = round_percent(blended).min(MAX_SCORE);

    tracing::debug!(
        user_followers = user_followers.len(),
        user_following = user_following.len(),
        target_followers = target_followers.len(),
        target_following = target_following.len(),
        common_followers = common_followers.len(),
        common_following = common_following.len(),
        score,
        "Computed compatibility"
    );

    CompatibilityResult {
        score,
        common_followers,
        common_following,
        details: CompatibilityDetails {
            follower_overlap: round_percent(follower_overlap),
            following_overlap: round_percent(following_overlap),
            total_user_connections: user_followers.len() + user_following.len(),
            total_target_connections: target_followers.len() + target_following.len(),
        },
    }
}
