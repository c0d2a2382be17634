use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use instalytics::{DEFAULT_POST_COUNT, ProfileSnapshot, ScrapeError, Scraper, clamp_post_count};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub(crate) type AppState = State<Arc<Scraper>>;

pub(crate) fn router(scraper: Arc<Scraper>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/instaData", get(handle_insta_data))
        .layer(TraceLayer::new_for_http())
        .with_state(scraper)
}

/// JSON error body with the status it should be served under.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        let status = match &err {
            ScrapeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ScrapeError::NotFound(_) => StatusCode::NOT_FOUND,
            ScrapeError::AccessDenied(_) => StatusCode::FORBIDDEN,
            ScrapeError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::BAD_GATEWAY,
        };

        if status == StatusCode::BAD_GATEWAY {
            tracing::error!(target: "instalytics", "Upstream failure: {err}");
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub(crate) struct InstaDataQuery {
    username: Option<String>,
    /// Kept as text so a malformed value gets the JSON error body.
    number_of_posts: Option<String>,
}

pub(crate) async fn handle_insta_data(
    State(scraper): AppState,
    Query(query): Query<InstaDataQuery>,
) -> Result<Json<ProfileSnapshot>, ApiError> {
    let username = query
        .username
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("Username parameter is required"))?;

    let count = match query.number_of_posts.as_deref() {
        None => DEFAULT_POST_COUNT,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(clamp_post_count)
            .map_err(|_| ApiError::bad_request("number_of_posts must be an integer"))?,
    };

    let snapshot = scraper.analyze(username, count).await?;
    Ok(Json(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use httpmock::MockServer;
    use instalytics::ScraperConfig;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(server: &MockServer) -> Router {
        let config = ScraperConfig::default().with_base_url(server.base_url());
        router(Arc::new(Scraper::new(config).unwrap()))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn serve_profile(server: &MockServer, edges: usize) {
        let edges: Vec<Value> = (0..edges)
            .map(|i| {
                json!({"node": {
                    "shortcode": format!("P{i}"),
                    "taken_at_timestamp": 1_717_200_000,
                    "edge_liked_by": {"count": 10 * (i + 1)},
                    "edge_media_to_comment": {"count": i + 1}
                }})
            })
            .collect();

        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET)
                    .path("/api/v1/users/web_profile_info/")
                    .query_param("username", "nasa");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"data": {"user": {
                        "id": "42",
                        "username": "nasa",
                        "full_name": "NASA",
                        "is_private": false,
                        "edge_followed_by": {"count": 100},
                        "edge_follow": {"count": 1},
                        "edge_owner_to_timeline_media": {
                            "count": edges.len(),
                            "page_info": {"has_next_page": false},
                            "edges": edges
                        }
                    }}, "status": "ok"}));
            })
            .await;
    }

    #[tokio::test]
    async fn health_is_plain_text() {
        let server = MockServer::start_async().await;
        let response = app(&server)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn returns_the_snapshot_with_a_default_of_three_posts() {
        let server = MockServer::start_async().await;
        serve_profile(&server, 5).await;

        let (status, body) = get_json(app(&server), "/instaData?username=%40nasa").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "nasa");
        assert_eq!(body["posts"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["engagement_summary"]["total_likes"], 60);
        assert_eq!(body["engagement_summary"]["engagement_rate"], 22.0);
    }

    #[tokio::test]
    async fn post_count_is_clamped() {
        let server = MockServer::start_async().await;
        serve_profile(&server, 12).await;

        let (_, body) = get_json(app(&server), "/instaData?username=nasa&number_of_posts=50").await;
        assert_eq!(body["posts"].as_array().map(Vec::len), Some(10));

        let (_, body) = get_json(app(&server), "/instaData?username=nasa&number_of_posts=0").await;
        assert_eq!(body["posts"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn bad_parameters_are_rejected() {
        let server = MockServer::start_async().await;

        for uri in [
            "/instaData",
            "/instaData?username=",
            "/instaData?username=%20%20",
            "/instaData?username=nasa&number_of_posts=three",
            "/instaData?username=%40",
        ] {
            let (status, body) = get_json(app(&server), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn upstream_errors_keep_their_meaning() {
        let cases = [
            (404, StatusCode::NOT_FOUND),
            (403, StatusCode::FORBIDDEN),
            (429, StatusCode::TOO_MANY_REQUESTS),
            (500, StatusCode::BAD_GATEWAY),
        ];

        for (upstream, expected) in cases {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(httpmock::Method::GET)
                        .path("/api/v1/users/web_profile_info/");
                    then.status(upstream);
                })
                .await;

            let (status, body) = get_json(app(&server), "/instaData?username=ghost").await;
            assert_eq!(status, expected, "upstream {upstream}");
            assert!(body["error"].is_string());
        }
    }
}
