use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const INSTAGRAM_BASE_URL: &str = "https://www.instagram.com";

/// Desktop browser user agent; the web endpoints reject obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_USERNAME: &str = "INSTAGRAM_USERNAME";
const ENV_PASSWORD: &str = "INSTAGRAM_PASSWORD";
const ENV_TARGET_ACCOUNT: &str = "TARGET_ACCOUNT";
const ENV_SESSION_FILE: &str = "INSTALYTICS_SESSION_FILE";
const ENV_BASE_URL: &str = "INSTALYTICS_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "INSTALYTICS_TIMEOUT_SECS";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the scraper needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub credentials: Option<Credentials>,
    pub target_account: Option<String>,
    pub session_file: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: INSTAGRAM_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
            target_account: None,
            session_file: None,
        }
    }
}

impl ScraperConfig {
    /// Build a config from the process environment, honouring a `.env` file if one exists.
    ///
    /// Credentials are only picked up when both the username and password are set.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(target: "instalytics", path = %path.display(), "Loaded .env file");
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let credentials = match (non_empty(ENV_USERNAME), non_empty(ENV_PASSWORD)) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            _ => None,
        };

        let timeout = non_empty(ENV_TIMEOUT_SECS)
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let session_file = non_empty(ENV_SESSION_FILE).map(PathBuf::from).or_else(|| {
            credentials
                .as_ref()
                .map(|creds| default_session_file(&creds.username))
        });

        Self {
            base_url: non_empty(ENV_BASE_URL).unwrap_or_else(|| INSTAGRAM_BASE_URL.to_string()),
            timeout,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials,
            target_account: non_empty(ENV_TARGET_ACCOUNT),
            session_file,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    pub fn with_target_account(mut self, account: impl Into<String>) -> Self {
        self.target_account = Some(account.into());
        self
    }
}

pub fn default_session_file(username: &str) -> PathBuf {
    PathBuf::from(format!("session-{username}.json"))
}
