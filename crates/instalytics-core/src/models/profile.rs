use crate::engagement::{self, EngagementSummary};
use crate::models::PostSnapshot;
use crate::timeline::MediaConnection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fetched account. Also the handle the post sampler pages from.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub followers: u64,
    pub following: u64,
    pub total_posts: u64,
    pub is_private: bool,
    pub is_verified: bool,
    pub biography: String,
    pub external_url: Option<String>,
    /// Whether the requesting session follows this account.
    pub followed_by_viewer: bool,
    pub retrieved_at: DateTime<Utc>,
    pub(crate) timeline: MediaConnection,
}

impl Profile {
    /// Private accounts only expose their media to followers.
    pub fn posts_visible(&self) -> bool {
        !self.is_private || self.followed_by_viewer
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub username: String,
    pub full_name: String,
    pub followers: u64,
    pub following: u64,
    pub total_posts: u64,
    pub is_private: bool,
    pub is_verified: bool,
    pub biography: String,
    pub external_url: Option<String>,
    pub retrieved_at: DateTime<Utc>,
    pub posts: Vec<PostSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_summary: Option<EngagementSummary>,
}

impl ProfileSnapshot {
    pub fn new(profile: &Profile, posts: Vec<PostSnapshot>) -> Self {
        let engagement_summary = engagement::summarize(&posts, profile.followers);

        Self {
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            followers: profile.followers,
            following: profile.following,
            total_posts: profile.total_posts,
            is_private: profile.is_private,
            is_verified: profile.is_verified,
            biography: profile.biography.clone(),
            external_url: profile.external_url.clone(),
            retrieved_at: profile.retrieved_at,
            posts,
            engagement_summary,
        }
    }
}

impl From<&Profile> for ProfileSnapshot {
    fn from(profile: &Profile) -> Self {
        Self::new(profile, Vec::new())
    }
}
