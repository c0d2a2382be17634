use crate::api::InstagramApiClient;
use crate::api::endpoints::Endpoints;
use crate::error::{Result, ScrapeError};
use crate::models::Profile;
use crate::timeline::{Count, MediaConnection};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    pub external_url: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub followed_by_viewer: bool,
    #[serde(default)]
    pub edge_followed_by: Count,
    #[serde(default)]
    pub edge_follow: Count,
    #[serde(default)]
    pub edge_owner_to_timeline_media: MediaConnection,
}

#[derive(Debug, Deserialize)]
struct ProfileInfoResponse {
    data: Option<ProfileInfoData>,
}

#[derive(Debug, Deserialize)]
struct ProfileInfoData {
    user: Option<RawUser>,
}

/// Strip whitespace and any leading `@` so `@abc` and `abc` address the same account.
pub fn normalize_username(input: &str) -> Result<String> {
    let username = input.trim().trim_start_matches('@').trim();

    if username.is_empty() {
        return Err(ScrapeError::InvalidInput("username must not be empty".into()));
    }

    Ok(username.to_string())
}

pub fn parse_profile(user: RawUser) -> Profile {
    Profile {
        user_id: user.id,
        username: user.username,
        full_name: user.full_name.unwrap_or_default(),
        followers: user.edge_followed_by.count,
        following: user.edge_follow.count,
        total_posts: user.edge_owner_to_timeline_media.count,
        is_private: user.is_private,
        is_verified: user.is_verified,
        biography: user.biography.unwrap_or_default(),
        external_url: user.external_url.filter(|url| !url.is_empty()),
        followed_by_viewer: user.followed_by_viewer,
        retrieved_at: Utc::now(),
        timeline: user.edge_owner_to_timeline_media,
    }
}

pub async fn fetch_profile(client: &InstagramApiClient, username: &str) -> Result<Profile> {
    let username = normalize_username(username)?;
    tracing::info!(target: "instalytics", %username, "Fetching profile");

    let response: ProfileInfoResponse = client
        .get(&Endpoints::web_profile_info(&username), &username)
        .await?;

    let user = response
        .data
        .and_then(|data| data.user)
        .ok_or_else(|| ScrapeError::NotFound(username.clone()))?;

    Ok(parse_profile(user))
}
