use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Profile '{0}' not found")]
    NotFound(String),

    #[error("Login required to access '{0}'")]
    AccessDenied(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Invalid username or password")]
    BadCredentials,

    #[error("Two-factor authentication required")]
    TwoFactorRequired,

    #[error("Login interrupted by a security checkpoint: {0}")]
    Checkpoint(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Errors that logging in could plausibly fix.
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::AccessDenied(_))
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
