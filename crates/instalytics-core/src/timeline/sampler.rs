use super::{MediaConnection, MediaPageResponse, parse_post};
use crate::api::InstagramApiClient;
use crate::api::endpoints::{Endpoints, MEDIA_PAGE_SIZE};
use crate::error::{Result, ScrapeError};
use crate::models::{PostSnapshot, Profile};
use async_stream::try_stream;
use futures::{Stream, StreamExt, TryStreamExt};

/// Lazily walk a profile's media, most recent first.
///
/// The media embedded in the profile response is yielded before any further
/// page is requested, and a page is only requested once the consumer polls
/// past everything already fetched.
pub fn post_stream<'a>(
    client: &'a InstagramApiClient,
    profile: &'a Profile,
) -> impl Stream<Item = Result<PostSnapshot>> + 'a {
    try_stream! {
        let mut page = profile.timeline.clone();
        let mut position = 0;

        // Logged-out responses sometimes omit the embedded media entirely.
        if page.edges.is_empty() && page.next_cursor().is_none() && profile.total_posts > 0 {
            page = fetch_page(client, profile, None).await?;
        }

        loop {
            for edge in &page.edges {
                position += 1;
                yield parse_post(&edge.node, position);
            }

            let Some(cursor) = page.next_cursor().map(str::to_string) else {
                break;
            };

            page = fetch_page(client, profile, Some(&cursor)).await?;
            if page.edges.is_empty() {
                break;
            }
        }
    }
}

async fn fetch_page(
    client: &InstagramApiClient,
    profile: &Profile,
    cursor: Option<&str>,
) -> Result<MediaConnection> {
    tracing::debug!(
        target: "instalytics",
        username = %profile.username,
        ?cursor,
        "Fetching media page"
    );

    let endpoint = Endpoints::profile_media(&profile.user_id, MEDIA_PAGE_SIZE, cursor);
    let response: MediaPageResponse = client.get(&endpoint, &profile.username).await?;

    response
        .data
        .and_then(|data| data.user)
        .map(|user| user.edge_owner_to_timeline_media)
        .ok_or_else(|| ScrapeError::InvalidResponse("media page without a user".into()))
}

/// The `count` most recent posts, or fewer if the profile has fewer.
///
/// A private profile the session cannot see yields no posts rather than an
/// error.
pub async fn sample_recent_posts(
    client: &InstagramApiClient,
    profile: &Profile,
    count: usize,
) -> Result<Vec<PostSnapshot>> {
    if !profile.posts_visible() {
        tracing::warn!(
            target: "instalytics",
            username = %profile.username,
            "Private account, post data unavailable"
        );
        return Ok(Vec::new());
    }

    post_stream(client, profile).take(count).try_collect().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::GuestAuth;
    use crate::config::ScraperConfig;
    use crate::profile::{RawUser, parse_profile};
    use httpmock::MockServer;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn client_for(server: &MockServer) -> InstagramApiClient {
        let config = ScraperConfig::default().with_base_url(server.base_url());
        InstagramApiClient::new(&config, Arc::new(GuestAuth)).unwrap()
    }

    fn edges(shortcodes: &[&str], likes: u64) -> Vec<Value> {
        shortcodes
            .iter()
            .map(|code| {
                json!({"node": {
                    "shortcode": code,
                    "taken_at_timestamp": 1_700_000_000,
                    "edge_liked_by": {"count": likes},
                    "edge_media_to_comment": {"count": 1}
                }})
            })
            .collect()
    }

    fn profile(is_private: bool, followed: bool, media: Value) -> Profile {
        let raw: RawUser = serde_json::from_value(json!({
            "id": "777",
            "username": "someone",
            "full_name": "Some One",
            "biography": "",
            "is_private": is_private,
            "is_verified": false,
            "followed_by_viewer": followed,
            "edge_followed_by": {"count": 100},
            "edge_follow": {"count": 10},
            "edge_owner_to_timeline_media": media
        }))
        .unwrap();
        parse_profile(raw)
    }

    #[tokio::test]
    async fn takes_from_the_embedded_page_without_fetching_more() {
        // No mocks registered: any extra request would fail the test.
        let server = MockServer::start_async().await;
        let profile = profile(
            false,
            false,
            json!({
                "count": 50,
                "page_info": {"has_next_page": true, "end_cursor": "CURSOR1"},
                "edges": edges(&["a", "b", "c", "d"], 10)
            }),
        );

        let posts = sample_recent_posts(&client_for(&server), &profile, 3)
            .await
            .unwrap();

        let codes: Vec<_> = posts.iter().map(|p| p.shortcode.as_str()).collect();
        assert_eq!(codes, vec!["a", "b", "c"]);
        assert_eq!(
            posts.iter().map(|p| p.post_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn follows_the_cursor_when_the_first_page_runs_out() {
        let server = MockServer::start_async().await;
        let next = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET)
                    .path("/graphql/query/")
                    .query_param("query_hash", crate::api::endpoints::PROFILE_MEDIA_QUERY_HASH);
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "data": {"user": {"edge_owner_to_timeline_media": {
                            "count": 4,
                            "page_info": {"has_next_page": false, "end_cursor": null},
                            "edges": edges(&["c", "d"], 5)
                        }}},
                        "status": "ok"
                    }));
            })
            .await;

        let profile = profile(
            false,
            false,
            json!({
                "count": 4,
                "page_info": {"has_next_page": true, "end_cursor": "CURSOR1"},
                "edges": edges(&["a", "b"], 10)
            }),
        );

        let posts = sample_recent_posts(&client_for(&server), &profile, 10)
            .await
            .unwrap();

        next.assert_async().await;
        assert_eq!(posts.len(), 4, "never more than the profile has");
        assert_eq!(posts.last().map(|p| p.post_number), Some(4));
        assert_eq!(posts.last().map(|p| p.like_count), Some(5));
    }

    #[tokio::test]
    async fn fetches_the_first_page_when_none_is_embedded() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET)
                    .path("/graphql/query/")
                    .query_param("query_hash", crate::api::endpoints::PROFILE_MEDIA_QUERY_HASH);
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "data": {"user": {"edge_owner_to_timeline_media": {
                            "count": 3,
                            "page_info": {"has_next_page": false, "end_cursor": null},
                            "edges": edges(&["x", "y", "z"], 7)
                        }}},
                        "status": "ok"
                    }));
            })
            .await;

        let profile = profile(
            false,
            false,
            json!({"count": 3, "page_info": {"has_next_page": false}, "edges": []}),
        );

        let posts = sample_recent_posts(&client_for(&server), &profile, 2)
            .await
            .unwrap();

        first.assert_async().await;
        let codes: Vec<_> = posts.iter().map(|p| p.shortcode.as_str()).collect();
        assert_eq!(codes, vec!["x", "y"]);
        assert_eq!(posts.first().map(|p| p.post_number), Some(1));
        assert_eq!(posts.first().map(|p| p.like_count), Some(7));
    }

    #[tokio::test]
    async fn inaccessible_private_profile_yields_nothing() {
        let server = MockServer::start_async().await;
        let profile = profile(
            true,
            false,
            json!({"count": 12, "page_info": {"has_next_page": false}, "edges": []}),
        );

        let posts = sample_recent_posts(&client_for(&server), &profile, 3)
            .await
            .unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn followed_private_profile_is_sampled() {
        let server = MockServer::start_async().await;
        let profile = profile(
            true,
            true,
            json!({"count": 1, "page_info": {"has_next_page": false}, "edges": edges(&["p"], 3)}),
        );

        let posts = sample_recent_posts(&client_for(&server), &profile, 3)
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn paging_errors_surface() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/graphql/query/");
                then.status(429);
            })
            .await;

        let profile = profile(
            false,
            false,
            json!({
                "count": 30,
                "page_info": {"has_next_page": true, "end_cursor": "CURSOR1"},
                "edges": edges(&["a"], 1)
            }),
        );

        let err = sample_recent_posts(&client_for(&server), &profile, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::RateLimit));
    }
}
