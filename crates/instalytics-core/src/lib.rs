//! Instagram profile and engagement scraping.
//!
//! A [`Scraper`] resolves a username to a [`Profile`], samples its most recent
//! posts and folds the likes and comments into an [`EngagementSummary`]. The
//! result is a serializable [`ProfileSnapshot`] that the [`report`] module can
//! render for a terminal or write to disk.
//!
//! ```ignore
//! use instalytics::{Scraper, ScraperConfig};
//!
//! let scraper = Scraper::connect(ScraperConfig::from_env()).await?;
//! let snapshot = scraper.analyze("natgeo", 3).await?;
//! println!("{}", instalytics::report::render_analytics(&snapshot));
//! ```
//!
//! Anonymous access covers public profiles. Private accounts need a session
//! that follows them, either loaded from a session file or created by logging
//! in with the configured [`Credentials`].

pub mod api;
pub mod auth;
pub mod config;
pub mod engagement;
pub mod error;
pub mod models;
pub mod profile;
pub mod report;
pub mod scraper;
pub mod timeline;

pub use auth::{GuestAuth, InstagramAuth, Session};
pub use config::{Credentials, ScraperConfig};
pub use engagement::EngagementSummary;
pub use error::{Result, ScrapeError};
pub use models::{PostSnapshot, Profile, ProfileSnapshot};
pub use report::{ReportFormat, write_report};
pub use scraper::{DEFAULT_POST_COUNT, MAX_POST_COUNT, Scraper, clamp_post_count};
