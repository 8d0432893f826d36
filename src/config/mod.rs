//! Configuration loading and management.
//!
//! Loads configuration from `./trackmail.toml` (or `$TRACKMAIL_CONFIG_PATH`).
//! Environment variables override file values; file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration loaded from TOML.
///
/// Path: `./trackmail.toml` or `$TRACKMAIL_CONFIG_PATH`.
/// Env vars override file values; file values override defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackmailConfig {
    /// Extraction pipeline settings (`[pipeline]`).
    pub pipeline: PipelineConfig,
    /// Status classifier thresholds (`[classifier]`).
    pub classifier: ClassifierConfig,
    /// Semantic extraction adapter (`[semantic]`).
    pub semantic: SemanticConfig,
    /// Default log level when `RUST_LOG` is unset.
    pub log_level: LogLevel,
}

/// Wrapper so the log level default is `"info"` rather than empty.
#[derive(Debug, Clone, Deserialize)]
pub struct LogLevel(
    /// Filter directive handed to the subscriber, e.g. `"info"` or
    /// `"trackmail=debug"`.
    pub String,
);

impl Default for LogLevel {
    fn default() -> Self {
        Self("info".to_owned())
    }
}

/// Extraction pipeline tunables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum candidate confidence for acceptance below the subject layer.
    pub acceptance_floor: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            acceptance_floor: 60,
        }
    }
}

/// Classifier thresholds.
///
/// `rejection_threshold` is deliberately its own knob: whether soft apology
/// phrasing ("unfortunately we must reschedule…") should outrank live
/// interview signals is a product decision, not a constant.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum matched weight for any status to beat `not_job_related`.
    pub status_threshold: u32,
    /// Matched rejection weight at which rejection dominates.
    pub rejection_threshold: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            status_threshold: 2,
            rejection_threshold: 2,
        }
    }
}

/// Semantic extraction adapter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Whether the AI-context layer is wired in at all.
    pub enabled: bool,
    /// Base URL of the Ollama-compatible chat endpoint.
    pub base_url: String,
    /// Model name sent with each request.
    pub model: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Per-attempt timeout; on expiry the layer abstains.
    pub timeout_secs: u64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://127.0.0.1:11434".to_owned(),
            model: "llama3.1".to_owned(),
            api_key: None,
            timeout_secs: 8,
        }
    }
}

impl TrackmailConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$TRACKMAIL_CONFIG_PATH` or `./trackmail.toml`.
    /// If the file does not exist, returns defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML string directly (test seam).
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config TOML")
    }

    fn load_from_file() -> Result<Self> {
        let path = Self::config_path_with(|key| std::env::var(key).ok());
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve config path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(p) = env("TRACKMAIL_CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("trackmail.toml")
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids unsafe `set_var` in
    /// tests). Invalid values are warned about and ignored.
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        fn parse_into<T: std::str::FromStr>(slot: &mut T, var: &'static str, value: &str) {
            match value.parse() {
                Ok(parsed) => *slot = parsed,
                Err(_) => tracing::warn!(
                    var,
                    value,
                    "ignoring invalid env override"
                ),
            }
        }

        // Pipeline.
        if let Some(v) = env("TRACKMAIL_ACCEPTANCE_FLOOR") {
            parse_into(&mut self.pipeline.acceptance_floor, "TRACKMAIL_ACCEPTANCE_FLOOR", &v);
        }

        // Classifier.
        if let Some(v) = env("TRACKMAIL_STATUS_THRESHOLD") {
            parse_into(&mut self.classifier.status_threshold, "TRACKMAIL_STATUS_THRESHOLD", &v);
        }
        if let Some(v) = env("TRACKMAIL_REJECTION_THRESHOLD") {
            parse_into(
                &mut self.classifier.rejection_threshold,
                "TRACKMAIL_REJECTION_THRESHOLD",
                &v,
            );
        }

        // Semantic adapter. An API key in the environment implies intent to
        // use the layer, so it also flips `enabled` on.
        if let Some(v) = env("TRACKMAIL_SEMANTIC_ENABLED") {
            parse_into(&mut self.semantic.enabled, "TRACKMAIL_SEMANTIC_ENABLED", &v);
        }
        if let Some(v) = env("TRACKMAIL_SEMANTIC_URL") {
            self.semantic.base_url = v;
        }
        if let Some(v) = env("TRACKMAIL_SEMANTIC_MODEL") {
            self.semantic.model = v;
        }
        if let Some(key) = env("TRACKMAIL_SEMANTIC_API_KEY") {
            self.semantic.api_key = Some(key);
            self.semantic.enabled = true;
        }
        if let Some(v) = env("TRACKMAIL_SEMANTIC_TIMEOUT_SECS") {
            parse_into(&mut self.semantic.timeout_secs, "TRACKMAIL_SEMANTIC_TIMEOUT_SECS", &v);
        }

        // Logging.
        if let Some(v) = env("TRACKMAIL_LOG_LEVEL") {
            self.log_level = LogLevel(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = TrackmailConfig::default();
        assert_eq!(config.pipeline.acceptance_floor, 60);
        assert_eq!(config.classifier.status_threshold, 2);
        assert_eq!(config.classifier.rejection_threshold, 2);
        assert!(!config.semantic.enabled);
        assert_eq!(config.log_level.0, "info");
    }

    #[test]
    fn toml_sections_override_defaults() {
        let config = TrackmailConfig::from_toml(
            r#"
            [pipeline]
            acceptance_floor = 70

            [classifier]
            rejection_threshold = 3

            [semantic]
            enabled = true
            model = "mistral"
            "#,
        )
        .expect("should parse");
        assert_eq!(config.pipeline.acceptance_floor, 70);
        assert_eq!(config.classifier.rejection_threshold, 3);
        assert_eq!(config.classifier.status_threshold, 2);
        assert!(config.semantic.enabled);
        assert_eq!(config.semantic.model, "mistral");
    }

    #[test]
    fn env_overrides_beat_file_values() {
        let mut config = TrackmailConfig::from_toml("[pipeline]\nacceptance_floor = 70")
            .expect("should parse");
        config.apply_overrides(|key| match key {
            "TRACKMAIL_ACCEPTANCE_FLOOR" => Some("55".to_owned()),
            "TRACKMAIL_SEMANTIC_MODEL" => Some("phi3".to_owned()),
            _ => None,
        });
        assert_eq!(config.pipeline.acceptance_floor, 55);
        assert_eq!(config.semantic.model, "phi3");
    }

    #[test]
    fn invalid_env_override_is_ignored() {
        let mut config = TrackmailConfig::default();
        config.apply_overrides(|key| {
            (key == "TRACKMAIL_STATUS_THRESHOLD").then(|| "lots".to_owned())
        });
        assert_eq!(config.classifier.status_threshold, 2);
    }

    #[test]
    fn api_key_in_env_enables_semantic_layer() {
        let mut config = TrackmailConfig::default();
        config.apply_overrides(|key| {
            (key == "TRACKMAIL_SEMANTIC_API_KEY").then(|| "sk-test".to_owned())
        });
        assert!(config.semantic.enabled);
        assert_eq!(config.semantic.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn config_path_honours_env_var() {
        let path = TrackmailConfig::config_path_with(|key| {
            (key == "TRACKMAIL_CONFIG_PATH").then(|| "/tmp/custom.toml".to_owned())
        });
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
        let default = TrackmailConfig::config_path_with(|_| None);
        assert_eq!(default, PathBuf::from("trackmail.toml"));
    }
}
