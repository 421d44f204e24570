//! Signed-in identity

use serde::{Deserialize, Serialize};

use super::UserId;

/// The signed-in user as seen by the engine
///
/// Passed explicitly to the favorites store and the play-history recorder;
/// the engine never consults ambient session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique user identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Whether the user may reach the admin screens
    #[serde(default)]
    pub is_admin: bool,
}

impl Identity {
    /// Create a regular (non-admin) identity
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            name: name.into(),
            is_admin: false,
        }
    }

    /// Mark this identity as an administrator
    #[must_use]
    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}
