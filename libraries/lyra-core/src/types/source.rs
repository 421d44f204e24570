//! Queue source locator
//!
//! Where a queue was built from ("this playlist", "these search results").
//! Only used to jump back to that screen, never for playback ordering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque locator of the screen a queue was constructed from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueSource(String);

impl QueueSource {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueueSource {
    fn from(locator: &str) -> Self {
        Self::new(locator)
    }
}
