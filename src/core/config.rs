//! Configuration management for Systemize.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::i18n::Locale;
use super::timer::Millis;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Conversation pacing
    pub conversation: ConversationConfig,

    /// Highlight and scroll synchronization
    pub highlight: HighlightConfig,

    /// Terminal interface settings
    pub ui: UiConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Locale used for every prompt and notice
    pub locale: Locale,

    /// Where projects are saved (defaults to the platform data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// How many prior projects the opening prompt offers to resume
    pub max_resumable: usize,
}

/// Timing of the thinking placeholder and progressive reveal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Replies longer than this many characters are revealed in chunks
    pub reveal_threshold: usize,

    /// Characters disclosed per chunk
    pub reveal_chunk: usize,

    /// Delay between chunks
    pub reveal_interval_ms: Millis,

    /// How long the thinking placeholder shows before a reply appears
    pub thinking_delay_ms: Millis,
}

/// Timing of highlight emphasis and the manual-scroll lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// How long a highlight stays emphasized
    pub emphasis_ms: Millis,

    /// How long automatic scrolling is suppressed after a manual scroll
    pub scroll_lock_ms: Millis,
}

/// Terminal interface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme name (default, dracula, nord)
    pub theme: String,

    /// Upper bound on the event poll interval
    pub tick_rate_ms: Millis,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.systemize.toml` in current directory
    /// 2. `~/.config/systemize/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(".systemize.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(global_config) = Self::config_dir().map(|d| d.join("config.toml")) {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        std::fs::create_dir_all(&dir)?;

        let content = toml::to_string_pretty(self)?;
        std::fs::write(dir.join("config.toml"), content)?;

        Ok(())
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("systemize"))
    }

    /// Directory projects are saved in.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.general
            .data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("systemize")))
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { locale: Locale::En, data_dir: None, max_resumable: 3 }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            reveal_threshold: 120,
            reveal_chunk: 24,
            reveal_interval_ms: 30,
            thinking_delay_ms: 600,
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self { emphasis_ms: 2_800, scroll_lock_ms: 1_200 }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { theme: "default".to_string(), tick_rate_ms: 100 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.locale, Locale::En);
        assert_eq!(config.general.max_resumable, 3);
        assert_eq!(config.highlight.emphasis_ms, 2_800);
        assert_eq!(config.highlight.scroll_lock_ms, 1_200);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[conversation]"));
        assert!(toml_str.contains("[highlight]"));
        assert!(toml_str.contains("[ui]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            locale = "es"
            data_dir = "/tmp/systemize"

            [conversation]
            reveal_chunk = 8
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.locale, Locale::Es);
        assert_eq!(config.data_dir(), Some(PathBuf::from("/tmp/systemize")));
        assert_eq!(config.conversation.reveal_chunk, 8);
        // Untouched keys keep their defaults
        assert_eq!(config.conversation.reveal_threshold, 120);
        assert_eq!(config.highlight.emphasis_ms, 2_800);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[highlight]\nscroll_lock_ms = 900\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.highlight.scroll_lock_ms, 900);
    }
}
