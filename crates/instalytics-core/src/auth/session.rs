use super::InstagramAuth;
use crate::api::InstagramApiClient;
use crate::api::endpoints::Endpoints;
use crate::api::requests::error_for_status;
use crate::config::{Credentials, ScraperConfig};
use crate::error::{Result, ScrapeError};
use chrono::{DateTime, Utc};
use cookie::{Cookie, CookieJar};
use reqwest::Method;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue, REFERER, SET_COOKIE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const SESSION_COOKIE: &str = "sessionid";
const CSRF_COOKIE: &str = "csrftoken";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    authenticated: Option<bool>,
    user: Option<bool>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
    two_factor_required: Option<bool>,
    checkpoint_url: Option<String>,
    message: Option<String>,
}

/// An authenticated cookie set. Built once by logging in or loading a
/// session file, then only read.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    username: String,
    user_id: Option<String>,
    cookies: BTreeMap<String, String>,
    created_at: DateTime<Utc>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("user_id", &self.user_id)
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl Session {
    pub fn new(username: impl Into<String>, cookies: BTreeMap<String, String>) -> Self {
        Self {
            username: username.into(),
            user_id: None,
            cookies,
            created_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn login(client: &InstagramApiClient, credentials: &Credentials) -> Result<Self> {
        tracing::info!(target: "instalytics", username = %credentials.username, "Logging in");

        let mut jar = CookieJar::new();

        let home = client
            .send_raw(Method::GET, &Endpoints::home(), HeaderMap::new(), None)
            .await?;
        absorb_cookies(&mut jar, &home.headers);

        let csrf_token = jar
            .get(CSRF_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| ScrapeError::Auth("No csrftoken cookie in the login page".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert("X-CSRFToken", header_value(&csrf_token)?);
        headers.insert(COOKIE, header_value(&cookie_header(&jar_values(&jar)))?);
        headers.insert(
            REFERER,
            header_value(&format!("{}/accounts/login/", client.base_url()))?,
        );

        let form = [
            ("username", credentials.username.clone()),
            (
                "enc_password",
                format!(
                    "#PWD_INSTAGRAM_BROWSER:0:{}:{}",
                    Utc::now().timestamp(),
                    credentials.password
                ),
            ),
            ("queryParams", "{}".to_string()),
            ("optIntoOneTap", "false".to_string()),
        ];

        let response = client
            .send_raw(Method::POST, &Endpoints::login(), headers, Some(&form))
            .await?;
        absorb_cookies(&mut jar, &response.headers);

        let outcome: LoginResponse = match serde_json::from_str(&response.body) {
            Ok(outcome) => outcome,
            Err(_) if !response.status.is_success() => {
                return Err(error_for_status(
                    response.status,
                    &response.headers,
                    &response.body,
                    &credentials.username,
                ));
            }
            Err(err) => return Err(err.into()),
        };

        if outcome.two_factor_required == Some(true) {
            return Err(ScrapeError::TwoFactorRequired);
        }

        if let Some(url) = outcome.checkpoint_url {
            return Err(ScrapeError::Checkpoint(url));
        }

        match (outcome.authenticated, outcome.user) {
            (Some(true), _) => {}
            (_, Some(false)) => {
                return Err(ScrapeError::Auth(format!(
                    "No account named '{}'",
                    credentials.username
                )));
            }
            (Some(false), _) => return Err(ScrapeError::BadCredentials),
            _ => {
                return Err(ScrapeError::Auth(outcome.message.unwrap_or_else(|| {
                    format!("Login failed with status {}", response.status)
                })));
            }
        }

        let cookies = jar_values(&jar);
        if !cookies.contains_key(SESSION_COOKIE) {
            return Err(ScrapeError::Auth(
                "Login succeeded but no session cookie was issued".into(),
            ));
        }

        tracing::info!(target: "instalytics", username = %credentials.username, "Logged in");

        Ok(Self {
            username: credentials.username.clone(),
            user_id: outcome.user_id,
            cookies,
            created_at: Utc::now(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let session: Self = serde_json::from_str(&contents)?;

        if !session.cookies.contains_key(SESSION_COOKIE) {
            return Err(ScrapeError::Auth(format!(
                "Session file {} has no {SESSION_COOKIE} cookie",
                path.display()
            )));
        }

        tracing::debug!(
            target: "instalytics",
            path = %path.display(),
            username = %session.username,
            "Loaded session"
        );
        Ok(session)
    }

    /// Write the session next to `path` and rename it into place, so a reader
    /// never sees a half-written file. Concurrent writers: last one wins.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file_name = path.file_name().ok_or_else(|| {
            ScrapeError::InvalidInput(format!("{} is not a file path", path.display()))
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(format!(".{}.tmp", std::process::id()));
        let tmp_path = path.with_file_name(tmp_name);

        let contents = serde_json::to_string_pretty(self)?;
        let written = write_private(&tmp_path, contents.as_bytes())
            .and_then(|()| fs::rename(&tmp_path, path));

        if let Err(err) = written {
            // Nothing useful to do if the leftover can't be removed either.
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }

        tracing::debug!(target: "instalytics", path = %path.display(), "Saved session");
        Ok(())
    }

    /// Save to `path` if one is given. A session that cannot be written is
    /// still a valid session, so failures are only logged.
    pub(crate) fn persist(&self, path: Option<&Path>) {
        let Some(path) = path else {
            return;
        };

        if let Err(err) = self.save(path) {
            tracing::warn!(
                target: "instalytics",
                path = %path.display(),
                "Could not save session, continuing without it: {err}"
            );
        }
    }

    /// The configured session file, if it exists, parses and belongs to the
    /// configured account. Never touches the network.
    pub fn restore(config: &ScraperConfig) -> Option<Self> {
        let path = config.session_file.as_deref().filter(|p| p.exists())?;

        match Self::load(path) {
            Ok(session) if matches_credentials(&session, config.credentials.as_ref()) => {
                Some(session)
            }
            Ok(session) => {
                tracing::warn!(
                    target: "instalytics",
                    saved = %session.username,
                    "Session file belongs to a different account"
                );
                None
            }
            Err(err) => {
                tracing::warn!(
                    target: "instalytics",
                    path = %path.display(),
                    "Ignoring unusable session file: {err}"
                );
                None
            }
        }
    }

    /// Resolve the session for this run: a saved session file if usable, else
    /// a fresh login (saved for next time), else nothing.
    pub async fn bootstrap(
        client: &InstagramApiClient,
        config: &ScraperConfig,
    ) -> Result<Option<Self>> {
        if let Some(session) = Self::restore(config) {
            return Ok(Some(session));
        }

        let Some(credentials) = config.credentials.as_ref() else {
            return Ok(None);
        };

        let session = Self::login(client, credentials).await?;
        session.persist(config.session_file.as_deref());
        Ok(Some(session))
    }
}

impl InstagramAuth for Session {
    fn install_headers(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(COOKIE, header_value(&cookie_header(&self.cookies))?);

        if let Some(token) = self.cookies.get(CSRF_COOKIE) {
            headers.insert("X-CSRFToken", header_value(token)?);
        }

        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.cookies.contains_key(SESSION_COOKIE)
    }

    fn username(&self) -> Option<&str> {
        Some(&self.username)
    }
}

/// The file carries a live session cookie: owner-only on unix.
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

fn matches_credentials(session: &Session, credentials: Option<&Credentials>) -> bool {
    credentials.is_none_or(|creds| creds.username == session.username)
}

fn absorb_cookies(jar: &mut CookieJar, headers: &HeaderMap) {
    for value in headers.get_all(SET_COOKIE) {
        if let Ok(raw) = value.to_str() {
            if let Ok(cookie) = Cookie::parse(raw) {
                // Instagram clears cookies by re-sending them empty.
                if cookie.value().is_empty() || cookie.value() == "\"\"" {
                    jar.remove(Cookie::new(cookie.name().to_string(), ""));
                } else {
                    jar.add(cookie.into_owned());
                }
            }
        }
    }
}

fn jar_values(jar: &CookieJar) -> BTreeMap<String, String> {
    jar.iter()
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
        .collect()
}

fn cookie_header(cookies: &BTreeMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ScrapeError::Auth(e.to_string()))
}
