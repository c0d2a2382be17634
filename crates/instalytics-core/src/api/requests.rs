use crate::error::{Result, ScrapeError};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Failure envelope the web API uses for most refusals.
#[derive(Debug, Default, Deserialize)]
struct ApiFailure {
    status: Option<String>,
    message: Option<String>,
    require_login: Option<bool>,
}

pub async fn send_raw(
    client: &Client,
    url: &str,
    headers: HeaderMap,
    method: Method,
    form: Option<&[(&str, String)]>,
) -> Result<RawResponse> {
    let mut request = client.request(method, url).headers(headers);

    if let Some(form) = form {
        request = request.form(form);
    }

    let response = request.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;

    tracing::debug!(target: "instalytics", %url, %status, bytes = body.len(), "API response");

    Ok(RawResponse {
        status,
        headers,
        body,
    })
}

/// Issue a request and decode a successful JSON body into `T`.
///
/// `subject` names the thing being fetched (usually a username) so refusals
/// can be reported against it.
pub async fn request_api<T>(
    client: &Client,
    url: &str,
    headers: HeaderMap,
    method: Method,
    subject: &str,
) -> Result<T>
where
    T: DeserializeOwned,
{
    let response = send_raw(client, url, headers, method, None).await?;

    if !response.status.is_success() {
        return Err(error_for_status(
            response.status,
            &response.headers,
            &response.body,
            subject,
        ));
    }

    match serde_json::from_str::<T>(&response.body) {
        Ok(parsed) => Ok(parsed),
        Err(err) => Err(classify_unparsable(&response.body, subject, err)),
    }
}

pub(crate) fn error_for_status(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    subject: &str,
) -> ScrapeError {
    let failure: ApiFailure = serde_json::from_str(body).unwrap_or_default();

    if failure.require_login == Some(true) {
        return ScrapeError::AccessDenied(subject.to_string());
    }

    if failure
        .message
        .as_deref()
        .is_some_and(|message| message.contains("wait a few minutes"))
    {
        return ScrapeError::RateLimit;
    }

    match status {
        StatusCode::NOT_FOUND => ScrapeError::NotFound(subject.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ScrapeError::AccessDenied(subject.to_string())
        }
        StatusCode::TOO_MANY_REQUESTS => ScrapeError::RateLimit,
        s if s.is_redirection() && redirects_to_login(headers) => {
            ScrapeError::AccessDenied(subject.to_string())
        }
        s => {
            let detail = failure
                .message
                .or(failure.status)
                .map(|m| format!(" ({m})"))
                .unwrap_or_default();
            ScrapeError::Api(format!("Request failed with status: {s}{detail}"))
        }
    }
}

fn redirects_to_login(headers: &HeaderMap) -> bool {
    headers
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|location| location.contains("/accounts/login"))
}

/// A 200 that isn't the JSON we asked for is usually the HTML login wall.
fn classify_unparsable(body: &str, subject: &str, err: serde_json::Error) -> ScrapeError {
    let trimmed = body.trim_start();

    if trimmed.starts_with('<') {
        if body.contains("/accounts/login") {
            return ScrapeError::AccessDenied(subject.to_string());
        }
        return ScrapeError::InvalidResponse("expected JSON, received HTML".to_string());
    }

    ScrapeError::Json(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn status_error(status: u16, body: &str) -> ScrapeError {
        let status = StatusCode::from_u16(status).unwrap();
        error_for_status(status, &HeaderMap::new(), body, "someone")
    }

    #[test]
    fn maps_refusals_onto_the_taxonomy() {
        assert!(matches!(status_error(404, ""), ScrapeError::NotFound(u) if u == "someone"));
        assert!(matches!(status_error(403, ""), ScrapeError::AccessDenied(_)));
        assert!(matches!(status_error(401, ""), ScrapeError::AccessDenied(_)));
        assert!(matches!(status_error(429, ""), ScrapeError::RateLimit));
        assert!(matches!(status_error(500, ""), ScrapeError::Api(_)));
    }

    #[test]
    fn body_flags_take_precedence_over_status() {
        let body = r#"{"message":"Please wait a few minutes before you try again.","status":"fail"}"#;
        assert!(matches!(status_error(401, body), ScrapeError::RateLimit));

        let body = r#"{"require_login":true,"status":"fail"}"#;
        assert!(matches!(status_error(400, body), ScrapeError::AccessDenied(_)));
    }

    #[test]
    fn login_redirect_means_access_denied() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LOCATION,
            HeaderValue::from_static("https://www.instagram.com/accounts/login/?next=/x"),
        );
        let err = error_for_status(StatusCode::FOUND, &headers, "", "x");
        assert!(matches!(err, ScrapeError::AccessDenied(_)));
    }

    #[test]
    fn html_login_wall_is_access_denied() {
        let err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let classified = classify_unparsable(
            "<html><a href=\"/accounts/login/\">Log in</a></html>",
            "x",
            err,
        );
        assert!(matches!(classified, ScrapeError::AccessDenied(_)));
    }
}
