/*!
 * Provider capability boundary for translation services.
 *
 * The pipeline is provider-agnostic: anything implementing
 * `TranslationProvider` can be injected. Concrete vendor HTTP clients live
 * outside this crate; the implementations shipped here are offline:
 * - `mock`: configurable behaviors for tests
 * - `pseudo`: deterministic pseudo-translation for dry runs
 */

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// How inline markup and placeholders in the payload should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// No markup; translate everything
    #[default]
    Plain,

    /// HTML fragments; tags and entities must survive translation
    Html,

    /// JSON-ish payloads; braces and placeholders must survive translation
    Json,
}

/// Formality register requested from providers that support one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Default,
    More,
    Less,
}

/// Per-call options handed to the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderOptions {
    /// Escaping mode for the batch content
    #[serde(default)]
    pub content_mode: ContentMode,

    /// Formality setting, when the provider supports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formality: Option<Formality>,

    /// Free-form style instructions passed through to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_instructions: Option<String>,
}

/// Common trait for all translation providers.
///
/// A provider translates one batch of unique strings into one target
/// language. It must return a value for every requested string or omit the
/// failed ones; the controller substitutes the source text for missing keys
/// rather than failing the batch.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate a batch of unique strings into `target_language`.
    ///
    /// The returned map is keyed by the exact input strings.
    async fn translate(
        &self,
        strings: &[String],
        source_language: &str,
        target_language: &str,
        options: &ProviderOptions,
    ) -> Result<HashMap<String, String>, ProviderError>;

    /// Largest batch this provider accepts in one call.
    fn max_batch_size(&self) -> usize {
        25
    }

    /// Short provider name for logs and reports.
    fn name(&self) -> &str;
}

pub mod mock;
pub mod pseudo;

pub use mock::{MockBehavior, MockProvider};
pub use pseudo::PseudoProvider;
