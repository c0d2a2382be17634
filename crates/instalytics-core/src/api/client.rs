use crate::api::endpoints::{ApiEndpoint, IG_APP_ID};
use crate::api::requests::{RawResponse, request_api, send_raw};
use crate::auth::InstagramAuth;
use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// HTTP plumbing shared by every fetch: one connection pool, one base URL and
/// the auth capability whose headers go on each request.
#[derive(Debug, Clone)]
pub struct InstagramApiClient {
    client: Client,
    base_url: String,
    auth: Arc<dyn InstagramAuth>,
}

impl InstagramApiClient {
    pub fn new(config: &ScraperConfig, auth: Arc<dyn InstagramAuth>) -> Result<Self> {
        let base_url = url::Url::parse(&config.base_url).map_err(|err| {
            ScrapeError::InvalidInput(format!("base url '{}': {err}", config.base_url))
        })?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert("X-IG-App-ID", HeaderValue::from_static(IG_APP_ID));
        default_headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        default_headers.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );

        // Redirects are surfaced rather than followed: a 302 to the login page
        // is how access refusals show up.
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(default_headers)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Same connection pool, different identity.
    pub fn with_auth(&self, auth: Arc<dyn InstagramAuth>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            auth,
        }
    }

    pub fn auth(&self) -> &dyn InstagramAuth {
        &*self.auth
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &ApiEndpoint) -> String {
        endpoint.to_request_url(&self.base_url)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &ApiEndpoint,
        subject: &str,
    ) -> Result<T> {
        let mut headers = HeaderMap::new();
        self.auth.install_headers(&mut headers)?;

        request_api(&self.client, &self.url(endpoint), headers, Method::GET, subject).await
    }

    /// Unauthenticated request whose status and headers the caller interprets
    /// itself; used by the login flow.
    pub(crate) async fn send_raw(
        &self,
        method: Method,
        endpoint: &ApiEndpoint,
        headers: HeaderMap,
        form: Option<&[(&str, String)]>,
    ) -> Result<RawResponse> {
        send_raw(&self.client, &self.url(endpoint), headers, method, form).await
    }
}
