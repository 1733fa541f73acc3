use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::dedup::Glossary;
use crate::providers::{ContentMode, Formality, ProviderOptions};
use crate::rebuild::OverwriteMode;

/// Application configuration module
/// This module handles the pipeline configuration including loading,
/// validating and saving configuration settings. Settings are always passed
/// explicitly into the pipeline stages, never read as ambient state.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language tag (e.g. "en" or "en-US")
    pub source_language: String,

    /// Target language tags, processed in this order
    pub target_languages: Vec<String>,

    /// Inter-request pacing preset
    #[serde(default)]
    pub pacing: RequestPacing,

    /// Content-type mode forwarded to the provider
    #[serde(default)]
    pub content_mode: ContentMode,

    /// Formality setting, when the provider supports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formality: Option<Formality>,

    /// Free-form style instructions forwarded to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_instructions: Option<String>,

    /// Exact-match strings excluded from translation
    #[serde(default)]
    pub do_not_translate: Vec<String>,

    /// Predefined translations: source string -> (language -> text)
    #[serde(default)]
    pub glossary: Glossary,

    /// Per-language policy for documents that already carry that language
    #[serde(default)]
    pub overwrite_modes: HashMap<String, OverwriteMode>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_languages: Vec::new(),
            pacing: RequestPacing::default(),
            content_mode: ContentMode::default(),
            formality: None,
            style_instructions: None,
            do_not_translate: Vec::new(),
            glossary: Glossary::new(),
            overwrite_modes: HashMap::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values.
    pub fn validate(&self) -> Result<()> {
        let _source_name = crate::language_utils::language_name(&self.source_language)?;

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for target in &self.target_languages {
            let _target_name = crate::language_utils::language_name(target)?;
            if crate::language_utils::language_tags_match(&self.source_language, target) {
                return Err(anyhow!(
                    "Target language '{}' is the same as the source language",
                    target
                ));
            }
        }
        Ok(())
    }

    /// Provider options derived from this configuration.
    pub fn provider_options(&self) -> ProviderOptions {
        ProviderOptions {
            content_mode: self.content_mode,
            formality: self.formality,
            style_instructions: self.style_instructions.clone(),
        }
    }
}

/// Inter-request pacing presets applied before every provider call to
/// respect provider rate limits.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestPacing {
    /// ~100 ms between requests
    Fast,
    /// ~300 ms between requests
    #[default]
    Balanced,
    /// ~500 ms between requests
    Reliable,
}

impl RequestPacing {
    /// Delay inserted before each provider call.
    pub fn delay(&self) -> Duration {
        match self {
            RequestPacing::Fast => Duration::from_millis(100),
            RequestPacing::Balanced => Duration::from_millis(300),
            RequestPacing::Reliable => Duration::from_millis(500),
        }
    }
}

impl std::fmt::Display for RequestPacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestPacing::Fast => "fast",
            RequestPacing::Balanced => "balanced",
            RequestPacing::Reliable => "reliable",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for RequestPacing {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "reliable" => Ok(Self::Reliable),
            _ => Err(anyhow!("Invalid pacing preset: {}", s)),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
