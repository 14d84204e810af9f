//! Application configuration loaded from file
//!
//! Herald reads `~/.config/herald/config.toml`. A missing or unparseable
//! file falls back to defaults with a log line, never an error: the agent
//! must stay usable with zero configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Capacity of the internal event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HeraldConfig {
    /// Deep-link security configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Presentation defaults
    #[serde(default)]
    pub presentation: PresentationConfig,
}

/// Deep-link security settings
///
/// When `deeplink_security` is off, deep links are refused by the trigger
/// router entirely. When it is on, every deep link must carry a `token`
/// parameter signed by the holder of the private key matching
/// `deeplink_security_key`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityConfig {
    /// Enable the deep-link trigger and its token requirement
    #[serde(default)]
    pub deeplink_security: bool,

    /// PEM-encoded RSA public key used to verify deep-link tokens
    #[serde(default)]
    pub deeplink_security_key: String,
}

/// Presentation defaults applied when the notification omits them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Window bar title fallback
    #[serde(default = "default_bar_title")]
    pub default_bar_title: String,

    /// Fallback timeout in seconds; `None` waits forever
    #[serde(default)]
    pub default_timeout: Option<u64>,

    /// Fallback icon path
    #[serde(default)]
    pub default_icon_path: Option<String>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            default_bar_title: default_bar_title(),
            default_timeout: None,
            default_icon_path: None,
        }
    }
}

fn default_bar_title() -> String {
    "Herald".to_string()
}

impl HeraldConfig {
    /// Load configuration from the default path (~/.config/herald/config.toml)
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Get the default configuration path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new().map_or_else(
            || PathBuf::from("~/.config/herald/config.toml"),
            |dirs| dirs.config_dir().join("herald").join("config.toml"),
        )
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Self {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Generate example configuration file content
    #[allow(dead_code)]
    pub fn example() -> String {
        r#"# Herald Configuration
# Place this file at ~/.config/herald/config.toml

[security]
# Enable the deep-link trigger. Deep links are refused while this is false.
deeplink_security = false

# PEM-encoded RSA public key verifying deep-link tokens (RS256)
deeplink_security_key = """
-----BEGIN PUBLIC KEY-----
...
-----END PUBLIC KEY-----
"""

[presentation]
# Window bar title used when the notification defines none
default_bar_title = "Herald"

# Seconds before an unanswered notification times out (unset: wait forever)
# default_timeout = 120

# Icon shown when the notification defines none
# default_icon_path = "/usr/share/icons/herald.png"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = HeraldConfig::load_from_path(PathBuf::from("/nonexistent/config.toml"));
        assert!(!config.security.deeplink_security);
        assert_eq!(config.presentation.default_bar_title, "Herald");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[security]
deeplink_security = true
deeplink_security_key = "-----BEGIN PUBLIC KEY-----"

[presentation]
default_bar_title = "Corp IT"
default_timeout = 60
"#
        )
        .unwrap();

        let config = HeraldConfig::load_from_path(file.path().to_path_buf());
        assert!(config.security.deeplink_security);
        assert!(config
            .security
            .deeplink_security_key
            .starts_with("-----BEGIN"));
        assert_eq!(config.presentation.default_bar_title, "Corp IT");
        assert_eq!(config.presentation.default_timeout, Some(60));
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml {{").unwrap();

        let config = HeraldConfig::load_from_path(file.path().to_path_buf());
        assert!(!config.security.deeplink_security);
    }

    #[test]
    fn test_example_parses() {
        let config: HeraldConfig = toml::from_str(&HeraldConfig::example()).unwrap();
        assert!(!config.security.deeplink_security);
    }
}
