//! Builder configuration, optionally loaded from a TOML file.
//!
//! The file is optional: a missing file yields `BuilderConfig::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::atom::LinkRelPolicy;
use crate::xml::WriteOptions;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Policies and output settings applied to new feeds and entries.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Initial value of `Feed::prettify`.
    pub prettify: bool,

    /// Spaces per nesting level in pretty-printed output.
    pub indent_width: usize,

    /// Which link relations `add_link` accepts.
    pub link_relations: LinkRelPolicy,

    /// Escape custom element values. When off, values are written as raw markup.
    pub escape_custom_values: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            prettify: true,
            indent_width: 2,
            link_relations: LinkRelPolicy::Strict,
            escape_custom_values: true,
        }
    }
}

impl BuilderConfig {
    /// Maximum config file size (64 KB).
    const MAX_FILE_SIZE: u64 = 65_536;

    const KNOWN_KEYS: [&'static str; 4] = [
        "prettify",
        "indent_width",
        "link_relations",
        "escape_custom_values",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(BuilderConfig::default())`
    /// - Empty file → `Ok(BuilderConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text. Blank input yields the defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: BuilderConfig = toml::from_str(content)?;
        tracing::info!(
            prettify = config.prettify,
            link_relations = ?config.link_relations,
            "Loaded builder configuration"
        );
        Ok(config)
    }

    pub fn write_options(&self, prettify: bool) -> WriteOptions {
        WriteOptions {
            prettify,
            indent_width: self.indent_width,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BuilderConfig::default();
        assert!(config.prettify);
        assert_eq!(config.indent_width, 2);
        assert_eq!(config.link_relations, LinkRelPolicy::Strict);
        assert!(config.escape_custom_values);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/atomgen_test_nonexistent_config.toml");
        let config = BuilderConfig::load(path).unwrap();
        assert_eq!(config, BuilderConfig::default());
    }

    #[test]
    fn test_whitespace_only_returns_default() {
        let config = BuilderConfig::from_toml("   \n  \n  ").unwrap();
        assert_eq!(config, BuilderConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let config = BuilderConfig::from_toml("link_relations = \"open\"\n").unwrap();
        assert_eq!(config.link_relations, LinkRelPolicy::Open);
        assert!(config.prettify);
        assert_eq!(config.indent_width, 2);
    }

    #[test]
    fn test_full_config_from_file() {
        let dir = std::env::temp_dir().join("atomgen_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
prettify = false
indent_width = 4
link_relations = "open"
escape_custom_values = false
"#;
        std::fs::write(&path, content).unwrap();

        let config = BuilderConfig::load(&path).unwrap();
        assert!(!config.prettify);
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.link_relations, LinkRelPolicy::Open);
        assert!(!config.escape_custom_values);
        assert_eq!(config.write_options(true).indent_width, 4);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = BuilderConfig::from_toml("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = BuilderConfig::from_toml("link_relations = \"anything\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = BuilderConfig::from_toml("prettify = false\ntotally_fake_key = 42\n").unwrap();
        assert!(!config.prettify);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("atomgen_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "#".repeat(65_537)).unwrap();

        let err = BuilderConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
