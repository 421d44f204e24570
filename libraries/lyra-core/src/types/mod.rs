//! Domain types shared across Lyra

mod identity;
mod ids;
mod source;
mod track;

pub use identity::Identity;
pub use ids::{TrackId, UserId};
pub use source::QueueSource;
pub use track::Track;
