pub mod client;
pub mod endpoints;
pub mod requests;
pub use client::InstagramApiClient;
pub use endpoints::Endpoints;
