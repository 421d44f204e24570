//! Player configuration loading
//!
//! An optional TOML file overlaid by `LYRA_`-prefixed environment variables,
//! e.g. `LYRA_INITIAL_VOLUME=0.4`.

use crate::error::{Result, ShellError};
use lyra_playback::PlayerConfig;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no path is given
const DEFAULT_CONFIG_FILE: &str = "lyra.toml";

/// Load configuration from file and environment
///
/// An explicit `path` must exist; the default file is optional.
pub fn load(path: Option<&Path>) -> Result<PlayerConfig> {
    let mut settings = config::Config::builder();

    match path {
        Some(path) => {
            settings = settings.add_source(config::File::from(path.to_path_buf()));
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                settings = settings.add_source(config::File::from(default_path));
            }
        }
    }

    // Override with environment variables (prefixed with LYRA_)
    settings = settings.add_source(config::Environment::with_prefix("LYRA").try_parsing(true));

    let config: PlayerConfig = settings
        .build()
        .map_err(|e| ShellError::Config(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ShellError::Config(e.to_string()))?;

    validate(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate(config: &PlayerConfig) -> Result<()> {
    if !(0.0..=1.0).contains(&config.initial_volume) {
        return Err(ShellError::Config(format!(
            "initial_volume must be within [0, 1], got {}",
            config.initial_volume
        )));
    }

    if !config.restart_threshold_secs.is_finite() || config.restart_threshold_secs < 0.0 {
        return Err(ShellError::Config(format!(
            "restart_threshold_secs must be a non-negative number, got {}",
            config.restart_threshold_secs
        )));
    }

    if config.fallback_return_target.trim().is_empty() {
        return Err(ShellError::Config(
            "fallback_return_target must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&PlayerConfig::default()).is_ok());
    }

    #[test]
    fn reads_file_with_partial_settings() {
        let file = write_config("initial_volume = 0.25\nrecord_history = false\n");

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.initial_volume, 0.25);
        assert!(!config.record_history);
        assert_eq!(config.restart_threshold_secs, 3.0);
        assert_eq!(config.fallback_return_target, "/recently-played");
    }

    #[test]
    fn rejects_out_of_range_volume() {
        let file = write_config("initial_volume = 1.5\n");
        assert!(matches!(load(Some(file.path())), Err(ShellError::Config(_))));
    }

    #[test]
    fn rejects_negative_threshold() {
        let config = PlayerConfig {
            restart_threshold_secs: -1.0,
            ..PlayerConfig::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_blank_fallback() {
        let config = PlayerConfig {
            fallback_return_target: "  ".to_string(),
            ..PlayerConfig::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = load(Some(Path::new("/nonexistent/lyra.toml")));
        assert!(matches!(result, Err(ShellError::Config(_))));
    }
}
