pub mod sampler;

pub use sampler::{post_stream, sample_recent_posts};

use crate::api::endpoints::post_url;
use crate::models::PostSnapshot;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Captions stored on a post are cut to this many characters.
pub const CAPTION_LIMIT: usize = 200;

#[allow(clippy::expect_used)]
static RE_HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B#(\w+)").expect("hashtag pattern is valid"));

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Count {
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaConnection {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<MediaEdge>,
}

impl MediaConnection {
    pub fn next_cursor(&self) -> Option<&str> {
        if self.page_info.has_next_page {
            self.page_info.end_cursor.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaEdge {
    pub node: MediaNode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaNode {
    pub shortcode: String,
    pub taken_at_timestamp: i64,
    #[serde(default)]
    pub is_video: bool,
    pub edge_liked_by: Option<Count>,
    pub edge_media_preview_like: Option<Count>,
    pub edge_media_to_comment: Option<Count>,
    pub edge_media_to_caption: Option<CaptionConnection>,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptionConnection {
    #[serde(default)]
    pub edges: Vec<CaptionEdge>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptionEdge {
    pub node: CaptionNode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptionNode {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Location {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaPageResponse {
    pub data: Option<MediaPageData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaPageData {
    pub user: Option<MediaPageUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaPageUser {
    pub edge_owner_to_timeline_media: MediaConnection,
}

pub fn parse_post(node: &MediaNode, post_number: usize) -> PostSnapshot {
    let full_caption = node
        .edge_media_to_caption
        .as_ref()
        .and_then(|captions| captions.edges.first())
        .map(|edge| edge.node.text.as_str());

    // Some payloads only carry the preview counter.
    let like_count = node
        .edge_liked_by
        .as_ref()
        .or(node.edge_media_preview_like.as_ref())
        .map(|c| c.count)
        .unwrap_or_default();

    PostSnapshot {
        post_number,
        shortcode: node.shortcode.clone(),
        url: post_url(&node.shortcode),
        published_at: DateTime::<Utc>::from_timestamp(node.taken_at_timestamp, 0)
            .unwrap_or_default(),
        like_count,
        comment_count: node
            .edge_media_to_comment
            .as_ref()
            .map(|c| c.count)
            .unwrap_or_default(),
        is_video: node.is_video,
        caption: full_caption
            .filter(|text| !text.is_empty())
            .map(|text| truncate_with_ellipsis(text, CAPTION_LIMIT)),
        hashtags: full_caption.map(extract_hashtags).unwrap_or_default(),
        location_name: node.location.as_ref().and_then(|l| l.name.clone()),
    }
}

/// Cut `text` to `limit` characters, marking the cut with `...`.
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => format!("{}...", text.get(..byte_index).unwrap_or(text)),
        None => text.to_string(),
    }
}

pub fn extract_hashtags(caption: &str) -> Vec<String> {
    RE_HASHTAG
        .captures_iter(caption)
        .filter_map(|captures| captures.get(1))
        .map(|tag| tag.as_str().to_lowercase())
        .collect()
}
