pub mod session;

pub use session::Session;

use crate::error::Result;
use reqwest::header::HeaderMap;
use std::fmt::Debug;

/// Something that can decorate outgoing requests with identity.
///
/// Implementations are immutable once built so a single instance can be shared
/// by every in-flight request.
pub trait InstagramAuth: Debug + Send + Sync {
    fn install_headers(&self, headers: &mut HeaderMap) -> Result<()>;

    fn is_authenticated(&self) -> bool;

    /// The account the requests are made as, if any.
    fn username(&self) -> Option<&str> {
        None
    }
}

/// Anonymous access: public profiles only.
#[derive(Debug, Default, Clone, Copy)]
pub struct GuestAuth;

impl InstagramAuth for GuestAuth {
    fn install_headers(&self, _headers: &mut HeaderMap) -> Result<()> {
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        false
    }
}
