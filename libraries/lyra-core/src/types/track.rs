//! Track domain type

use serde::{Deserialize, Serialize};

use super::TrackId;

/// Immutable track record supplied by the catalog screens
///
/// The engine never mutates a track; it clones it into the queue and refers
/// to it by `id` everywhere else. Duplicate ids in a queue are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    #[serde(default)]
    pub album: String,

    /// Duration in seconds, authoritative once metadata loads
    #[serde(default)]
    pub duration_seconds: f64,

    /// Locator the audio output resolves to bytes
    pub media_url: String,

    /// Cover art locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl Track {
    /// Create a track with the required fields
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            id: TrackId::new(id),
            title: title.into(),
            artist: artist.into(),
            album: String::new(),
            duration_seconds: 0.0,
            media_url: media_url.into(),
            cover_url: None,
        }
    }

    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// Set the duration, negative values are treated as unknown (0)
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = seconds.max(0.0);
        self
    }

    #[must_use]
    pub fn with_cover(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let track = Track::new("t1", "Song", "Artist", "https://cdn/t1.mp3")
            .with_album("Album")
            .with_duration(181.5)
            .with_cover("https://cdn/t1.jpg");

        assert_eq!(track.id.as_str(), "t1");
        assert_eq!(track.album, "Album");
        assert_eq!(track.duration_seconds, 181.5);
        assert_eq!(track.cover_url.as_deref(), Some("https://cdn/t1.jpg"));
    }

    #[test]
    fn negative_duration_is_unknown() {
        let track = Track::new("t1", "Song", "Artist", "u").with_duration(-4.0);
        assert_eq!(track.duration_seconds, 0.0);
    }

    #[test]
    fn deserializes_catalog_row_without_optional_fields() {
        let json = r#"{"id":"t9","title":"T","artist":"A","media_url":"https://cdn/t9.mp3"}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.id, TrackId::new("t9"));
        assert!(track.cover_url.is_none());
        assert_eq!(track.duration_seconds, 0.0);
    }
}
