use crate::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings that steer how query results are paged and echoed.
///
/// Owned by the host application; the dispatcher only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Request the next page of `/lb coords` results automatically
    pub auto_page: bool,

    /// Largest page count that will be paged through automatically
    pub max_auto_pages: u32,

    /// Re-echo parsed results in a compact format
    pub reformat_query_results: bool,

    /// Colour re-echoed results by spatial cluster
    pub recolour_query_results: bool,

    /// Fixed pause after each batch of `/region info` requests
    pub region_info_timeout_secs: f64,

    /// Delay charged per additional command in a batch
    pub chat_timeout_secs: f64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            auto_page: true,
            max_auto_pages: 3,
            reformat_query_results: true,
            recolour_query_results: true,
            region_info_timeout_secs: 0.0,
            chat_timeout_secs: 1.0,
        }
    }
}

impl ChatConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate().map_err(ChatError::invalid_config)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (name, value) in [
            ("region_info_timeout_secs", self.region_info_timeout_secs),
            ("chat_timeout_secs", self.chat_timeout_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        Ok(())
    }

    pub fn region_info_timeout_ms(&self) -> i64 {
        secs_to_millis(self.region_info_timeout_secs)
    }

    pub fn chat_timeout_ms(&self) -> i64 {
        secs_to_millis(self.chat_timeout_secs)
    }
}

fn secs_to_millis(secs: f64) -> i64 {
    (secs * 1000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.region_info_timeout_ms(), 0);
        assert_eq!(config.chat_timeout_ms(), 1_000);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ChatConfig::from_toml_str("max_auto_pages = 10\nauto_page = false\n").unwrap();
        assert_eq!(
            config,
            ChatConfig {
                max_auto_pages: 10,
                auto_page: false,
                ..ChatConfig::default()
            }
        );
    }

    #[test]
    fn rejects_negative_timeouts() {
        let err = ChatConfig::from_toml_str("chat_timeout_secs = -1.0").unwrap_err();
        assert!(matches!(err, ChatError::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn rejects_wrong_types() {
        let err = ChatConfig::from_toml_str("max_auto_pages = \"many\"").unwrap_err();
        assert!(matches!(err, ChatError::ConfigParse(_)), "{err}");
    }

    #[test]
    fn loads_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "reformat_query_results = false\n").unwrap();
        let config = ChatConfig::load(temp.path()).unwrap();
        assert!(!config.reformat_query_results);
        assert!(config.recolour_query_results);
    }
}
