/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with tagged translations
 * - `MockProvider::missing_keys(n)` - Succeeds but drops every nth key
 * - `MockProvider::transient()` - Always fails with a transient error
 * - `MockProvider::auth_failure()` - Always fails with an auth error
 * - `MockProvider::failing_language(lang)` - Transient failure for one language
 *
 * Every call is recorded, so tests can assert exactly which strings were
 * sent to the provider and in what order.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ProviderOptions, TranslationProvider};
use crate::errors::ProviderError;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,

    /// Succeeds but omits every nth requested key from the result
    MissingKeys { drop_every: usize },

    /// Always fails with a transient error
    Transient,

    /// Always fails with an authentication error
    AuthFailure,

    /// Transient failure whenever the target language matches
    FailingLanguage { language: String },

    /// Simulates a slow response (for pause/cancel timing tests)
    Slow { delay_ms: u64 },
}

/// One recorded provider call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The strings that were requested
    pub strings: Vec<String>,

    /// The target language of the call
    pub target_language: String,
}

/// Mock provider for exercising controller behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,

    /// Batch size reported to the controller
    batch_size: usize,

    /// Request counter
    request_count: Arc<AtomicUsize>,

    /// Every call made against this provider
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            batch_size: 25,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that drops every nth key from its responses
    pub fn missing_keys(drop_every: usize) -> Self {
        Self::new(MockBehavior::MissingKeys { drop_every })
    }

    /// Create a mock that always fails with a transient error
    pub fn transient() -> Self {
        Self::new(MockBehavior::Transient)
    }

    /// Create a mock that always fails with an authentication error
    pub fn auth_failure() -> Self {
        Self::new(MockBehavior::AuthFailure)
    }

    /// Create a mock that fails transiently for one target language only
    pub fn failing_language(language: &str) -> Self {
        Self::new(MockBehavior::FailingLanguage {
            language: language.to_string(),
        })
    }

    /// Create a mock with a simulated response delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Override the reported batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every recorded call
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Every string requested across all calls, in dispatch order
    pub fn requested_strings(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .flat_map(|call| call.strings.iter().cloned())
            .collect()
    }

    fn tag(target_language: &str, text: &str) -> String {
        format!("[{}] {}", target_language, text)
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            batch_size: self.batch_size,
            request_count: Arc::clone(&self.request_count),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    async fn translate(
        &self,
        strings: &[String],
        _source_language: &str,
        target_language: &str,
        _options: &ProviderOptions,
    ) -> Result<HashMap<String, String>, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(RecordedCall {
            strings: strings.to_vec(),
            target_language: target_language.to_string(),
        });

        match &self.behavior {
            MockBehavior::Working => Ok(strings
                .iter()
                .map(|s| (s.clone(), Self::tag(target_language, s)))
                .collect()),

            MockBehavior::MissingKeys { drop_every } => Ok(strings
                .iter()
                .enumerate()
                .filter(|(index, _)| drop_every == &0 || (index + 1) % drop_every != 0)
                .map(|(_, s)| (s.clone(), Self::tag(target_language, s)))
                .collect()),

            MockBehavior::Transient => Err(ProviderError::Transient(
                "simulated transient failure".to_string(),
            )),

            MockBehavior::AuthFailure => Err(ProviderError::AuthenticationError(
                "simulated invalid API key".to_string(),
            )),

            MockBehavior::FailingLanguage { language } => {
                if language == target_language {
                    Err(ProviderError::Transient(format!(
                        "simulated failure for language {}",
                        language
                    )))
                } else {
                    Ok(strings
                        .iter()
                        .map(|s| (s.clone(), Self::tag(target_language, s)))
                        .collect())
                }
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(strings
                    .iter()
                    .map(|s| (s.clone(), Self::tag(target_language, s)))
                    .collect())
            }
        }
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }

    fn name(&self) -> &str {
        "mock"
    }
}
