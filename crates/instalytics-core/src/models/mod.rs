pub mod post;
pub mod profile;
pub use post::PostSnapshot;
pub use profile::{Profile, ProfileSnapshot};
