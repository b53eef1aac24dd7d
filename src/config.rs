//! Adjustment settings
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags. Every field has a default, so an empty file is valid:
//!
//! ```toml
//! time_zone = "utc"
//! announce_base = false
//! require_header = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::calendar::TimeZoneMode;

/// Settings for one adjustment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdjustConfig {
    /// Zone for reading anchor lines and printing timestamps
    pub time_zone: TimeZoneMode,

    /// Emit an informational line after every anchor naming the new base
    pub announce_base: bool,

    /// Reject input whose first line does not start with `Trace file`
    pub require_header: bool,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            time_zone: TimeZoneMode::Local,
            announce_base: true,
            require_header: true,
        }
    }
}

impl AdjustConfig {
    /// Load settings from a TOML file
    ///
    /// # Errors
    /// Returns error if the file can't be read, isn't valid TOML, or names a
    /// setting that doesn't exist.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse TOML settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = AdjustConfig::default();
        assert_eq!(config.time_zone, TimeZoneMode::Local);
        assert!(config.announce_base);
        assert!(config.require_header);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = AdjustConfig::from_toml_str("").unwrap();
        assert_eq!(config, AdjustConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = AdjustConfig::from_toml_str("time_zone = \"utc\"\nannounce_base = false\n").unwrap();
        assert_eq!(config.time_zone, TimeZoneMode::Utc);
        assert!(!config.announce_base);
        assert!(config.require_header);
    }

    #[test]
    fn test_unknown_setting_rejected() {
        assert!(AdjustConfig::from_toml_str("timezone = \"utc\"").is_err());
    }

    #[test]
    fn test_bad_zone_rejected() {
        assert!(AdjustConfig::from_toml_str("time_zone = \"mars\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "require_header = false").unwrap();

        let config = AdjustConfig::from_toml(file.path()).unwrap();
        assert!(!config.require_header);
    }

    #[test]
    fn test_missing_file() {
        let err = AdjustConfig::from_toml("/nonexistent/traceadjust.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
