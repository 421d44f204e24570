//! Lyra Core
//!
//! Domain types and remote collaborator contracts shared by the Lyra
//! playback engine and the screens around it.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Identity`, `QueueSource` and their ids
//! - **Collaborator Traits**: `FavoritesService`, `PlayHistoryService`
//! - **Error Handling**: `ServiceError` and its `Result` alias
//! - **Reference Services**: in-memory implementations of both traits
//!
//! # Example
//!
//! ```rust
//! use lyra_core::types::{Identity, QueueSource, Track, TrackId};
//!
//! let user = Identity::new("alice", "Alice");
//! let track = Track::new("t1", "Blue in Green", "Miles Davis", "https://cdn.example/t1.mp3")
//!     .with_album("Kind of Blue")
//!     .with_duration(337.0);
//!
//! assert_eq!(track.id, TrackId::new("t1"));
//! assert_eq!(user.id.as_str(), "alice");
//! let _source = QueueSource::new("/album/kind-of-blue");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{Result, ServiceError};
pub use memory::{InMemoryFavorites, InMemoryPlayHistory};
pub use traits::{FavoritesService, PlayHistoryService};
pub use types::{Identity, QueueSource, Track, TrackId, UserId};
