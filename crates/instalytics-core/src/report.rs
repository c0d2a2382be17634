//! Human-readable renderings of a [`ProfileSnapshot`] and the files they are saved to.

use crate::error::Result;
use crate::models::ProfileSnapshot;
use crate::timeline::truncate_with_ellipsis;
use chrono::SecondsFormat;
use std::fs;
use std::path::{Path, PathBuf};

/// Captions and bios are previewed at this many characters on screen.
pub const PREVIEW_LIMIT: usize = 100;

const WIDE_RULE: usize = 60;
const NARROW_RULE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Profile counters only, `<user>_followers.txt`.
    Followers,
    /// Short analytics report, `<user>_report.txt`.
    Summary,
    /// Full analytics report, `<user>_analytics.txt`.
    Analytics,
    /// Pretty-printed snapshot, `<user>_analytics.json`.
    Json,
}

impl ReportFormat {
    pub fn file_name(self, username: &str) -> String {
        match self {
            Self::Followers => format!("{username}_followers.txt"),
            Self::Summary => format!("{username}_report.txt"),
            Self::Analytics => format!("{username}_analytics.txt"),
            Self::Json => format!("{username}_analytics.json"),
        }
    }

    pub fn render(self, snapshot: &ProfileSnapshot) -> Result<String> {
        Ok(match self {
            Self::Followers => render_followers_report(snapshot),
            Self::Summary => render_summary_report(snapshot),
            Self::Analytics => render_analytics_report(snapshot),
            Self::Json => serde_json::to_string_pretty(snapshot)?,
        })
    }
}

pub fn write_report(
    dir: &Path,
    snapshot: &ProfileSnapshot,
    format: ReportFormat,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format.file_name(&snapshot.username));
    fs::write(&path, format.render(snapshot)?)?;

    tracing::info!(target: "instalytics", path = %path.display(), "Report saved");
    Ok(path)
}

/// `1234567` → `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}

/// Fixed decimal places with a grouped integer part: `12345.67, 1` → `"12,345.7"`.
pub fn format_decimal(value: f64, places: usize) -> String {
    let fixed = format!("{:.*}", places, value.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    let whole = whole.parse::<u64>().map(group_thousands).unwrap_or_else(|_| whole.to_string());

    match fraction {
        Some(fraction) => format!("{sign}{whole}.{fraction}"),
        None => format!("{sign}{whole}"),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn tick(flag: bool) -> &'static str {
    if flag { "✓" } else { "✗" }
}

fn timestamp(snapshot: &ProfileSnapshot) -> String {
    snapshot.retrieved_at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Console view of the profile counters.
pub fn render_profile_card(snapshot: &ProfileSnapshot) -> String {
    let rule = "=".repeat(NARROW_RULE);
    let mut lines = vec![
        rule.clone(),
        format!("INSTAGRAM PROFILE: @{}", snapshot.username),
        rule.clone(),
        format!("Full Name: {}", snapshot.full_name),
        format!("Followers: {}", group_thousands(snapshot.followers)),
        format!("Following: {}", group_thousands(snapshot.following)),
        format!("Posts: {}", group_thousands(snapshot.total_posts)),
        format!("Private Account: {}", yes_no(snapshot.is_private)),
        format!("Verified: {}", yes_no(snapshot.is_verified)),
        format!("Bio: {}", truncate_with_ellipsis(&snapshot.biography, PREVIEW_LIMIT)),
    ];

    if let Some(url) = &snapshot.external_url {
        lines.push(format!("Website: {url}"));
    }

    lines.push(format!("Data retrieved: {}", timestamp(snapshot)));
    lines.push(rule);
    lines.join("\n")
}

/// One-glance console view.
pub fn render_quick_summary(snapshot: &ProfileSnapshot) -> String {
    let mut lines = vec![
        format!(
            "@{}: {} followers",
            snapshot.username,
            group_thousands(snapshot.followers)
        ),
        format!("Following: {}", group_thousands(snapshot.following)),
        format!("Posts: {}", group_thousands(snapshot.total_posts)),
        format!("Verified: {}", tick(snapshot.is_verified)),
    ];

    if let Some(summary) = &snapshot.engagement_summary {
        lines.push(format!(
            "Avg Likes: {}",
            format_decimal(summary.average_likes, 1)
        ));
        lines.push(format!(
            "Avg Comments: {}",
            format_decimal(summary.average_comments, 1)
        ));
        lines.push(format!("Engagement Rate: {:.2}%", summary.engagement_rate));
    }

    if snapshot.is_private {
        lines.push("Note: This is a private account, some data may be limited.".to_string());
    }

    lines.join("\n")
}

/// Detailed console view: profile, engagement and a per-post breakdown.
pub fn render_analytics(snapshot: &ProfileSnapshot) -> String {
    let rule = "=".repeat(WIDE_RULE);
    let mut lines = vec![
        rule.clone(),
        format!("INSTAGRAM ANALYTICS: @{}", snapshot.username),
        rule.clone(),
        "PROFILE OVERVIEW:".to_string(),
        format!("   Full Name: {}", snapshot.full_name),
        format!("   Followers: {}", group_thousands(snapshot.followers)),
        format!("   Following: {}", group_thousands(snapshot.following)),
        format!("   Total Posts: {}", group_thousands(snapshot.total_posts)),
        format!("   Verified: {}", tick(snapshot.is_verified)),
        format!("   Private: {}", yes_no(snapshot.is_private)),
    ];

    if let Some(summary) = &snapshot.engagement_summary {
        lines.push(String::new());
        lines.push(format!(
            "ENGAGEMENT ANALYTICS ({} recent posts):",
            summary.posts_analyzed
        ));
        lines.push(format!("   Total Likes: {}", group_thousands(summary.total_likes)));
        lines.push(format!(
            "   Total Comments: {}",
            group_thousands(summary.total_comments)
        ));
        lines.push(format!(
            "   Avg Likes/Post: {}",
            format_decimal(summary.average_likes, 1)
        ));
        lines.push(format!(
            "   Avg Comments/Post: {}",
            format_decimal(summary.average_comments, 1)
        ));
        lines.push(format!("   Engagement Rate: {:.2}%", summary.engagement_rate));
    }

    if !snapshot.posts.is_empty() {
        lines.push(String::new());
        lines.push("RECENT POSTS BREAKDOWN:".to_string());

        for post in &snapshot.posts {
            lines.push(String::new());
            lines.push(format!(
                "   Post #{} ({})",
                post.post_number,
                post.published_at.format("%Y-%m-%d")
            ));
            lines.push(format!("   Likes: {}", group_thousands(post.like_count)));
            lines.push(format!("   Comments: {}", group_thousands(post.comment_count)));
            lines.push(format!("   Type: {}", post.media_kind()));
            if let Some(location) = &post.location_name {
                lines.push(format!("   Location: {location}"));
            }
            if let Some(caption) = &post.caption {
                lines.push(format!(
                    "   Caption: {}",
                    truncate_with_ellipsis(caption, PREVIEW_LIMIT)
                ));
            }
            lines.push(format!("   URL: {}", post.url));
        }
    }

    lines.push(String::new());
    lines.push(format!("Data retrieved: {}", timestamp(snapshot)));
    lines.push(rule);
    lines.join("\n")
}

fn render_followers_report(snapshot: &ProfileSnapshot) -> String {
    let mut lines = vec![
        "Instagram Profile Data".to_string(),
        format!("Generated: {}", timestamp(snapshot)),
        String::new(),
        format!("Username: @{}", snapshot.username),
        format!("Full Name: {}", snapshot.full_name),
        format!("Followers: {}", group_thousands(snapshot.followers)),
        format!("Following: {}", group_thousands(snapshot.following)),
        format!("Posts: {}", group_thousands(snapshot.total_posts)),
        format!("Private Account: {}", yes_no(snapshot.is_private)),
        format!("Verified: {}", yes_no(snapshot.is_verified)),
        format!("Biography: {}", snapshot.biography),
    ];

    if let Some(url) = &snapshot.external_url {
        lines.push(format!("Website: {url}"));
    }

    finish(lines)
}

fn render_summary_report(snapshot: &ProfileSnapshot) -> String {
    let mut lines = vec![
        "Instagram Analytics Report".to_string(),
        format!("Profile: @{}", snapshot.username),
        format!("Generated: {}", timestamp(snapshot)),
        String::new(),
        "PROFILE SUMMARY:".to_string(),
        format!("Full Name: {}", snapshot.full_name),
        format!("Followers: {}", group_thousands(snapshot.followers)),
        format!("Total Posts: {}", group_thousands(snapshot.total_posts)),
        String::new(),
    ];

    if let Some(summary) = &snapshot.engagement_summary {
        lines.push("ENGAGEMENT STATS:".to_string());
        lines.push(format!(
            "Average Likes: {}",
            format_decimal(summary.average_likes, 1)
        ));
        lines.push(format!(
            "Average Comments: {}",
            format_decimal(summary.average_comments, 1)
        ));
        lines.push(format!("Engagement Rate: {:.2}%", summary.engagement_rate));
        lines.push(String::new());
    }

    if !snapshot.posts.is_empty() {
        lines.push("RECENT POSTS:".to_string());
        for post in &snapshot.posts {
            lines.push(String::new());
            lines.push(format!(
                "Post #{} - {}",
                post.post_number,
                post.published_at.format("%Y-%m-%d")
            ));
            lines.push(format!("Likes: {}", group_thousands(post.like_count)));
            lines.push(format!("Comments: {}", group_thousands(post.comment_count)));
            lines.push(format!("URL: {}", post.url));
        }
    }

    finish(lines)
}

fn render_analytics_report(snapshot: &ProfileSnapshot) -> String {
    let mut lines = vec![
        "Instagram Analytics Report".to_string(),
        format!("Generated: {}", timestamp(snapshot)),
        "=".repeat(NARROW_RULE),
        String::new(),
        format!("PROFILE: @{}", snapshot.username),
        format!("Full Name: {}", snapshot.full_name),
        format!("Followers: {}", group_thousands(snapshot.followers)),
        format!("Following: {}", group_thousands(snapshot.following)),
        format!("Total Posts: {}", group_thousands(snapshot.total_posts)),
        format!("Verified: {}", yes_no(snapshot.is_verified)),
        format!("Private: {}", yes_no(snapshot.is_private)),
        String::new(),
    ];

    if let Some(summary) = &snapshot.engagement_summary {
        lines.push(format!(
            "ENGAGEMENT SUMMARY ({} posts):",
            summary.posts_analyzed
        ));
        lines.push(format!("Total Likes: {}", group_thousands(summary.total_likes)));
        lines.push(format!(
            "Total Comments: {}",
            group_thousands(summary.total_comments)
        ));
        lines.push(format!(
            "Average Likes per Post: {}",
            format_decimal(summary.average_likes, 1)
        ));
        lines.push(format!(
            "Average Comments per Post: {}",
            format_decimal(summary.average_comments, 1)
        ));
        lines.push(format!("Engagement Rate: {:.2}%", summary.engagement_rate));
        lines.push(String::new());
    }

    if !snapshot.posts.is_empty() {
        lines.push("RECENT POSTS:".to_string());
        for post in &snapshot.posts {
            lines.push(String::new());
            lines.push(format!(
                "Post #{} - {}",
                post.post_number,
                post.published_at.format("%Y-%m-%d")
            ));
            lines.push(format!("Likes: {}", group_thousands(post.like_count)));
            lines.push(format!("Comments: {}", group_thousands(post.comment_count)));
            lines.push(format!("Type: {}", post.media_kind()));
            lines.push(format!("URL: {}", post.url));
            if let Some(location) = &post.location_name {
                lines.push(format!("Location: {location}"));
            }
            if let Some(caption) = &post.caption {
                lines.push(format!("Caption: {caption}"));
            }
        }
    }

    finish(lines)
}

fn finish(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
