use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSnapshot {
    /// 1-based position in the sample, most recent first.
    pub post_number: usize,
    pub shortcode: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub like_count: u64,
    pub comment_count: u64,
    pub is_video: bool,
    pub caption: Option<String>,
    pub hashtags: Vec<String>,
    pub location_name: Option<String>,
}

impl PostSnapshot {
    pub fn media_kind(&self) -> &'static str {
        if self.is_video { "Video" } else { "Photo" }
    }
}
