/*!
 * Pseudo-translation provider for offline dry runs.
 *
 * Wraps each string in a language-tagged bracket so a full pipeline run can
 * be validated end to end without network access, and so truncation or
 * placeholder-handling bugs show up visually in the output.
 */

use std::collections::HashMap;

use async_trait::async_trait;

use super::{ProviderOptions, TranslationProvider};
use crate::errors::ProviderError;

/// Deterministic offline provider: `Hello` becomes `[fr-FR] Hello`.
#[derive(Debug, Clone, Default)]
pub struct PseudoProvider {
    /// Batch size reported to the controller
    batch_size: Option<usize>,
}

impl PseudoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the reported batch size (mainly for tests).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

#[async_trait]
impl TranslationProvider for PseudoProvider {
    async fn translate(
        &self,
        strings: &[String],
        _source_language: &str,
        target_language: &str,
        _options: &ProviderOptions,
    ) -> Result<HashMap<String, String>, ProviderError> {
        Ok(strings
            .iter()
            .map(|s| (s.clone(), format!("[{}] {}", target_language, s)))
            .collect())
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(25)
    }

    fn name(&self) -> &str {
        "pseudo"
    }
}
