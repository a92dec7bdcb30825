//! Settings for the configuration checker

use std::path::{Path, PathBuf};

use common::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};
use vrrp_config::{ConfigBuilder, SystemInterfaces};

/// Settings error types
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid settings: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub parser: ParserSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Settings {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.parser.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// How configuration files are interpreted
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ParserSettings {
    /// Virtual addresses per instance before overflow into the excluded list
    #[validate(range(min = 1, max = 255))]
    pub max_virtual_addresses: usize,

    /// Check interface names against the running system
    pub verify_interfaces: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    #[validate(custom = "validate_level")]
    pub level: String,
    pub format: LogFormat,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            max_virtual_addresses: vrrp_config::types::VRRP_MAX_VIP,
            verify_interfaces: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

fn validate_level(level: &str) -> Result<(), ValidationError> {
    match level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
        _ => Err(ValidationError::new("unknown_log_level")),
    }
}

impl Settings {
    /// Load settings from the default search paths, or defaults when none exist
    pub fn load() -> Result<Self, SettingsError> {
        match Self::find_settings_file() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_yaml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    fn find_settings_file() -> Option<PathBuf> {
        Self::search_paths()
            .into_iter()
            .find(|p| p.exists() && p.is_file())
    }

    /// Locations searched by [`load`](Self::load), in priority order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/vrrp/vrrp-check.yaml")];

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config/vrrp/vrrp-check.yaml"));
        }

        paths.push(PathBuf::from("./vrrp-check.yaml"));
        paths
    }

    /// A builder configured from these settings
    pub fn config_builder(&self) -> ConfigBuilder {
        let builder =
            ConfigBuilder::new().with_max_virtual_addresses(self.parser.max_virtual_addresses);

        if self.parser.verify_interfaces {
            builder.with_interfaces(SystemInterfaces::new())
        } else {
            builder
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.parser.max_virtual_addresses, 20);
        assert!(!settings.parser.verify_interfaces);
    }

    #[test]
    fn test_valid_yaml_parsing() {
        let yaml = r#"
parser:
  max_virtual_addresses: 40
  verify_interfaces: true

logging:
  level: debug
  format: json
"#;

        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.parser.max_virtual_addresses, 40);
        assert!(settings.parser.verify_interfaces);
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
parser:
  verify_interfaces: true
"#;

        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.parser.max_virtual_addresses, 20);
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn test_invalid_capacity() {
        for value in ["0", "256"] {
            let yaml = format!("parser:\n  max_virtual_addresses: {value}\n");
            let settings: Settings = serde_yaml::from_str(&yaml).unwrap();
            assert!(settings.validate().is_err(), "{value} accepted");
        }
    }

    #[test]
    fn test_invalid_log_level() {
        assert!(validate_level("INFO").is_ok());
        assert!(validate_level("verbose").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vrrp-check.yaml");
        std::fs::write(&path, "parser:\n  max_virtual_addresses: 2\n").unwrap();

        let settings = Settings::load_from_file(&path).unwrap();
        assert_eq!(settings.parser.max_virtual_addresses, 2);

        std::fs::write(&path, "logging:\n  level: loud\n").unwrap();
        assert!(matches!(
            Settings::load_from_file(&path),
            Err(SettingsError::ValidationError(_))
        ));
    }

    #[test]
    fn test_search_paths_order() {
        let paths = Settings::search_paths();
        assert_eq!(paths.first().unwrap(), Path::new("/etc/vrrp/vrrp-check.yaml"));
        assert_eq!(paths.last().unwrap(), Path::new("./vrrp-check.yaml"));
    }
}
