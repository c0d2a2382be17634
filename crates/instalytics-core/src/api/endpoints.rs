use serde_json::json;

/// Web app id the instagram.com frontend sends with every API call.
pub const IG_APP_ID: &str = "936619743392459";

/// Persisted GraphQL query returning a page of a profile's timeline media.
pub const PROFILE_MEDIA_QUERY_HASH: &str = "003056d32c2554def87228bc3fd9668a";

/// Page size the web frontend uses for timeline media.
pub const MEDIA_PAGE_SIZE: usize = 12;

pub const POST_URL_PREFIX: &str = "https://www.instagram.com/p/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl ApiEndpoint {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            params: Vec::new(),
        }
    }

    fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }

    pub fn to_request_url(&self, base_url: &str) -> String {
        let url = format!("{}{}", base_url.trim_end_matches('/'), self.path);

        if self.params.is_empty() {
            return url;
        }

        let query = self
            .params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{url}?{query}")
    }
}

pub struct Endpoints;

impl Endpoints {
    pub fn home() -> ApiEndpoint {
        ApiEndpoint::new("/")
    }

    pub fn login() -> ApiEndpoint {
        ApiEndpoint::new("/api/v1/web/accounts/login/ajax/")
    }

    pub fn web_profile_info(username: &str) -> ApiEndpoint {
        ApiEndpoint::new("/api/v1/users/web_profile_info/").param("username", username)
    }

    pub fn profile_media(user_id: &str, first: usize, after: Option<&str>) -> ApiEndpoint {
        let mut variables = json!({
            "id": user_id,
            "first": first,
        });

        if let Some(cursor) = after {
            variables["after"] = json!(cursor);
        }

        ApiEndpoint::new("/graphql/query/")
            .param("query_hash", PROFILE_MEDIA_QUERY_HASH)
            .param("variables", variables.to_string())
    }
}

pub fn post_url(shortcode: &str) -> String {
    format!("{POST_URL_PREFIX}{shortcode}/")
}
