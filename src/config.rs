//! PromptShield configuration management

use crate::audit::AlertLevel;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main PromptShield configuration
///
/// Every option has a documented default; a config file only needs the keys
/// it wants to change. Unrecognized `alert_level` values fall back to `warn`
/// rather than rejecting the file, so a bad config cannot disable the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// Enforce the command whitelist strictly (reserved toggle)
    pub whitelist_mode: bool,

    /// Rewrite dangerous substrings in externally sourced content
    pub sanitize_enabled: bool,

    /// Classify memory records by trust before they reach agent context
    pub memory_segmentation: bool,

    /// Default severity for ambiguous findings
    pub alert_level: AlertLevel,

    /// Auto-block suspicious but non-definitive findings (reserved)
    pub block_suspicious: bool,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            whitelist_mode: true,
            sanitize_enabled: true,
            memory_segmentation: true,
            alert_level: AlertLevel::Warn,
            block_suspicious: false,
        }
    }
}

impl ShieldConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing keys take their defaults and unknown keys are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config file {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ShieldConfig::default();
        assert!(config.whitelist_mode);
        assert!(config.sanitize_enabled);
        assert!(config.memory_segmentation);
        assert_eq!(config.alert_level, AlertLevel::Warn);
        assert!(!config.block_suspicious);
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let config: ShieldConfig = toml::from_str("sanitize_enabled = false").unwrap();
        assert!(!config.sanitize_enabled);
        assert!(config.whitelist_mode);
        assert_eq!(config.alert_level, AlertLevel::Warn);
    }

    #[test]
    fn test_bogus_alert_level_falls_back_to_warn() {
        let config: ShieldConfig = toml::from_str(r#"alert_level = "bogus""#).unwrap();
        assert_eq!(config.alert_level, AlertLevel::Warn);
    }

    #[test]
    fn test_recognized_alert_level() {
        let config: ShieldConfig = toml::from_str(r#"alert_level = "critical""#).unwrap();
        assert_eq!(config.alert_level, AlertLevel::Critical);
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = ShieldConfig {
            memory_segmentation: false,
            alert_level: AlertLevel::Block,
            ..Default::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ShieldConfig = toml::from_str(&toml_str).unwrap();
        assert!(!parsed.memory_segmentation);
        assert_eq!(parsed.alert_level, AlertLevel::Block);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "whitelist_mode = true\nblock_suspicious = true").unwrap();

        let config = ShieldConfig::load(file.path()).unwrap();
        assert!(config.block_suspicious);
        assert!(config.sanitize_enabled);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ShieldConfig::load(Path::new("/nonexistent/shield.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
