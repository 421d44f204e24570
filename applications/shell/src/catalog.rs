//! Track catalog for the shell
//!
//! A JSON array of track records, or a small built-in demo set.

use crate::error::{Result, ShellError};
use lyra_core::Track;
use std::path::Path;

/// Load a catalog file
pub fn load(path: &Path) -> Result<Vec<Track>> {
    let text = std::fs::read_to_string(path)?;
    parse(&text).map_err(|e| match e {
        ShellError::Catalog(msg) => ShellError::Catalog(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Parse a catalog, rejecting an empty one
pub fn parse(text: &str) -> Result<Vec<Track>> {
    let tracks: Vec<Track> =
        serde_json::from_str(text).map_err(|e| ShellError::Catalog(e.to_string()))?;
    if tracks.is_empty() {
        return Err(ShellError::Catalog("catalog has no tracks".to_string()));
    }
    Ok(tracks)
}

/// Built-in catalog used when no file is given
pub fn demo() -> Vec<Track> {
    [
        ("d1", "Morning Static", "The Long Wires", 214.0),
        ("d2", "Harbor Lights", "The Long Wires", 187.0),
        ("d3", "Paper Satellites", "Iris Vale", 242.0),
        ("d4", "Slow Orbit", "Iris Vale", 305.0),
        ("d5", "Last Tram Home", "Northbound", 176.0),
    ]
    .into_iter()
    .map(|(id, title, artist, duration)| {
        Track::new(id, title, artist, format!("demo://{}.mp3", id))
            .with_album("Demo Sessions")
            .with_duration(duration)
    })
    .collect()
}
