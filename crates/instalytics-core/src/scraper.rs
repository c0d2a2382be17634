use crate::api::InstagramApiClient;
use crate::auth::{GuestAuth, InstagramAuth, Session};
use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::models::{PostSnapshot, Profile, ProfileSnapshot};
use std::sync::Arc;

/// Posts analysed when the caller does not say otherwise.
pub const DEFAULT_POST_COUNT: usize = 3;
pub const MAX_POST_COUNT: usize = 10;

/// Clamp a requested post count into `1..=MAX_POST_COUNT`.
pub fn clamp_post_count(count: i64) -> usize {
    count.clamp(1, MAX_POST_COUNT as i64) as usize
}

#[derive(Debug, Clone)]
pub struct Scraper {
    client: InstagramApiClient,
    config: ScraperConfig,
}

impl Scraper {
    /// Anonymous scraper: public profiles only.
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = InstagramApiClient::new(&config, Arc::new(GuestAuth))?;
        Ok(Self { client, config })
    }

    /// Scraper using whatever session the config resolves to: a saved session
    /// file, a fresh login, or none.
    pub async fn connect(config: ScraperConfig) -> Result<Self> {
        let scraper = Self::new(config)?;

        match Session::bootstrap(&scraper.client, &scraper.config).await? {
            Some(session) => Ok(scraper.with_session(session)),
            None => Ok(scraper),
        }
    }

    /// Anonymous scraper upgraded with the saved session, if there is a usable
    /// one. Logging in is left to the caller.
    pub fn resume(config: ScraperConfig) -> Result<Self> {
        let scraper = Self::new(config)?;

        match Session::restore(&scraper.config) {
            Some(session) => Ok(scraper.with_session(session)),
            None => Ok(scraper),
        }
    }

    pub fn with_session(self, session: Session) -> Self {
        self.with_auth(Arc::new(session))
    }

    pub fn with_auth(self, auth: Arc<dyn InstagramAuth>) -> Self {
        Self {
            client: self.client.with_auth(auth),
            config: self.config,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.auth().is_authenticated()
    }

    pub fn logged_in_as(&self) -> Option<&str> {
        self.client.auth().username()
    }

    /// Log in with the configured credentials. The session is also saved when
    /// a session file is configured; failing to save does not undo the login.
    pub async fn login(&mut self) -> Result<()> {
        let credentials = self.config.credentials.clone().ok_or_else(|| {
            ScrapeError::Auth(
                "No credentials provided (set INSTAGRAM_USERNAME and INSTAGRAM_PASSWORD)".into(),
            )
        })?;

        let session = Arc::new(Session::login(&self.client, &credentials).await?);
        self.client = self.client.with_auth(session.clone());

        session.persist(self.config.session_file.as_deref());
        Ok(())
    }

    pub async fn get_profile(&self, username: &str) -> Result<Profile> {
        crate::profile::fetch_profile(&self.client, username).await
    }

    pub async fn get_recent_posts(
        &self,
        profile: &Profile,
        count: usize,
    ) -> Result<Vec<PostSnapshot>> {
        crate::timeline::sample_recent_posts(&self.client, profile, count).await
    }

    /// Profile metadata only, no posts.
    pub async fn profile_snapshot(&self, username: &str) -> Result<ProfileSnapshot> {
        let profile = self.get_profile(username).await?;
        Ok(ProfileSnapshot::from(&profile))
    }

    /// Fetch, sample and summarise in one go.
    pub async fn analyze(&self, username: &str, count: usize) -> Result<ProfileSnapshot> {
        let profile = self.get_profile(username).await?;
        let posts = self.get_recent_posts(&profile, count).await?;

        tracing::info!(
            target: "instalytics",
            username = %profile.username,
            posts = posts.len(),
            "Analysed recent posts"
        );

        Ok(ProfileSnapshot::new(&profile, posts))
    }
}
