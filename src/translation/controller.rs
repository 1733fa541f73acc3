/*!
 * Translation controller: drives translation jobs to completion against a
 * provider capability, one target language at a time, while remaining
 * pausable and cancellable from outside.
 *
 * Scheduling is single-threaded and cooperative: there is exactly one
 * outstanding provider request, and control flags are observed only at the
 * two suspension points (the inter-request pacing delay and the
 * wait-until-resumed point). Within one language, canonical strings are
 * dispatched in the deduplicator's first-occurrence order, so progress
 * counters increase monotonically and are reproducible across runs.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::control::{ControlToken, RunState};
use super::memory::TranslationMemory;
use super::progress::{Phase, ProgressReporter};
use crate::app_config::RequestPacing;
use crate::dedup::{CanonicalString, DedupReport, Disposition, Glossary};
use crate::errors::AppError;
use crate::providers::{ProviderOptions, TranslationProvider};

/// Everything one run needs, threaded explicitly so the controller carries
/// no ambient state.
pub struct RunRequest<'a> {
    /// Deduplicated canonical strings to translate
    pub dedup: &'a DedupReport,

    /// Source language of all canonical strings
    pub source_language: &'a str,

    /// Target languages, processed sequentially in this order
    pub target_languages: &'a [String],

    /// Predefined translations resolved without a provider call
    pub glossary: &'a Glossary,

    /// Inter-request pacing preset
    pub pacing: RequestPacing,

    /// Options forwarded to every provider call
    pub provider_options: &'a ProviderOptions,
}

/// Per-language success/failure accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageOutcome {
    /// Target language tag
    pub language: String,

    /// Canonical strings resolved (provider, memory, or glossary)
    pub translated: usize,

    /// Canonical strings that fell back to source text
    pub failed: usize,

    /// Summary of the error that interrupted this language, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LanguageOutcome {
    fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            translated: 0,
            failed: 0,
            error: None,
        }
    }

    /// Whether this language finished without any failure.
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.failed == 0
    }
}

/// Accumulated statistics for one run, reported once the run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id of this run
    pub run_id: String,

    /// Outcome per fully processed language
    pub languages: Vec<LanguageOutcome>,

    /// Number of provider calls actually made
    pub provider_calls: usize,

    /// Canonical×language units resolved from translation memory
    pub memory_hits: usize,

    /// Canonical×language units resolved from the glossary
    pub glossary_hits: usize,

    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: u64,
}

impl RunReport {
    /// One-line summary like `3/5 languages completed, 2 had failures`.
    pub fn summary(&self) -> String {
        let succeeded = self.languages.iter().filter(|l| l.succeeded()).count();
        let failed = self.languages.len() - succeeded;
        if failed == 0 {
            format!("{}/{} languages completed", succeeded, self.languages.len())
        } else {
            format!(
                "{}/{} languages completed, {} had failures",
                succeeded,
                self.languages.len(),
                failed
            )
        }
    }

    /// Languages that finished cleanly.
    pub fn succeeded_languages(&self) -> Vec<&str> {
        self.languages
            .iter()
            .filter(|l| l.succeeded())
            .map(|l| l.language.as_str())
            .collect()
    }

    /// Languages with at least one failure.
    pub fn failed_languages(&self) -> Vec<&str> {
        self.languages
            .iter()
            .filter(|l| !l.succeeded())
            .map(|l| l.language.as_str())
            .collect()
    }
}

/// Result of a controller run.
///
/// `translations` maps target language to canonical-string id to translated
/// text; languages cancelled mid-flight are absent, so a cancelled run
/// contains only the languages that fully completed.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final state: `Completed` or `Cancelled`
    pub state: RunState,

    /// language -> canonical id -> translated text
    pub translations: HashMap<String, HashMap<String, String>>,

    /// Accumulated statistics
    pub report: RunReport,
}

/// Sequences translation jobs against an injected provider.
pub struct TranslationController {
    provider: Arc<dyn TranslationProvider>,
    memory: Option<Arc<dyn TranslationMemory>>,
}

impl TranslationController {
    /// Create a controller for the given provider.
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            provider,
            memory: None,
        }
    }

    /// Attach a translation memory consulted before each provider call.
    pub fn with_memory(mut self, memory: Arc<dyn TranslationMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Run all jobs to completion, cancellation, or fatal failure.
    ///
    /// Transient provider errors abandon the current language and continue
    /// with the next one; an authentication error fails the whole run
    /// immediately since retrying cannot help.
    pub async fn run(
        &self,
        request: RunRequest<'_>,
        mut token: ControlToken,
        progress: &ProgressReporter,
    ) -> Result<RunOutcome, AppError> {
        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let translatable: Vec<&CanonicalString> = request.dedup.translatable().collect();
        let total_jobs = translatable.len() * request.target_languages.len();

        info!(
            "Starting translation run {}: {} unique strings x {} languages via {}",
            run_id,
            translatable.len(),
            request.target_languages.len(),
            self.provider.name()
        );

        progress.update(|state| {
            state.phase = Phase::Translating;
            state.current = 0;
            state.total = total_jobs;
            state.paused = false;
            state.cancelled = false;
        });

        let mut report = RunReport {
            run_id,
            languages: Vec::new(),
            provider_calls: 0,
            memory_hits: 0,
            glossary_hits: 0,
            elapsed_ms: 0,
        };
        let mut translations: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut cancelled = false;

        'languages: for language in request.target_languages {
            progress.update(|state| state.current_language = Some(language.clone()));
            let mut outcome = LanguageOutcome::new(language);
            let mut resolved: HashMap<String, String> = HashMap::new();

            // Glossary-predefined strings resolve without any provider call
            for canonical in request
                .dedup
                .canonical
                .iter()
                .filter(|c| c.disposition == Disposition::Predefined)
            {
                if let Some(text) = request
                    .glossary
                    .get(&canonical.key)
                    .and_then(|targets| targets.get(language))
                {
                    resolved.insert(canonical.id.clone(), text.clone());
                    outcome.translated += 1;
                    report.glossary_hits += 1;
                }
            }

            // Translation-memory pre-check removes exact hits from the
            // provider workload
            let mut pending: Vec<&CanonicalString> = Vec::with_capacity(translatable.len());
            let mut memory_resolved = 0;
            for &canonical in &translatable {
                let hit = self.memory.as_ref().and_then(|memory| {
                    memory.lookup(&canonical.key, request.source_language, language)
                });
                match hit {
                    Some(text) => {
                        resolved.insert(canonical.id.clone(), text);
                        outcome.translated += 1;
                        report.memory_hits += 1;
                        memory_resolved += 1;
                    }
                    None => pending.push(canonical),
                }
            }
            if memory_resolved > 0 {
                debug!("{}: {} strings resolved from memory", language, memory_resolved);
                progress.update(|state| state.current += memory_resolved);
            }

            let batch_size = self.provider.max_batch_size().max(1);

            for (batch_index, batch) in pending.chunks(batch_size).enumerate() {
                // Suspension point: wait out a pause, mirroring the flag
                // into the progress state so observers see it
                if token.is_paused() {
                    info!("{}: run paused", language);
                    progress.update(|state| state.paused = true);
                    let resumed = token.wait_if_paused().await;
                    progress.update(|state| state.paused = false);
                    if !resumed {
                        cancelled = true;
                        break 'languages;
                    }
                    info!("{}: run resumed", language);
                }

                // Suspension point: inter-request pacing delay
                tokio::time::sleep(request.pacing.delay()).await;

                // Cancellation is cooperative, checked before each dispatch
                if token.is_cancelled() {
                    cancelled = true;
                    break 'languages;
                }

                let keys: Vec<String> = batch.iter().map(|c| c.key.clone()).collect();
                let result = self
                    .provider
                    .translate(&keys, request.source_language, language, request.provider_options)
                    .await;

                // A call already in flight is allowed to finish, but its
                // result is discarded if cancellation fired meanwhile
                if token.is_cancelled() {
                    cancelled = true;
                    break 'languages;
                }

                match result {
                    Ok(map) => {
                        report.provider_calls += 1;
                        for canonical in batch {
                            match map.get(&canonical.key) {
                                Some(text) => {
                                    resolved.insert(canonical.id.clone(), text.clone());
                                    if let Some(memory) = &self.memory {
                                        memory.store(
                                            &canonical.key,
                                            request.source_language,
                                            language,
                                            text,
                                        );
                                    }
                                    outcome.translated += 1;
                                }
                                None => {
                                    warn!(
                                        "{}: provider returned no value for '{}', keeping source text",
                                        language, canonical.key
                                    );
                                    resolved.insert(canonical.id.clone(), canonical.key.clone());
                                    outcome.failed += 1;
                                }
                            }
                        }
                        progress.update(|state| state.current += batch.len());
                    }
                    Err(e) if e.is_fatal() => {
                        error!("{}: fatal provider error, aborting run: {}", language, e);
                        return Err(AppError::Provider(e));
                    }
                    Err(e) => {
                        warn!(
                            "{}: transient provider error, moving to next language: {}",
                            language, e
                        );
                        let skipped = pending.len() - batch_index * batch_size;
                        outcome.failed += skipped;
                        outcome.error = Some(e.to_string());
                        break;
                    }
                }
            }

            translations.insert(language.clone(), resolved);
            report.languages.push(outcome);
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;

        let state = if cancelled {
            progress.update(|s| s.cancelled = true);
            info!("Translation run cancelled after {} ms", report.elapsed_ms);
            RunState::Cancelled
        } else {
            info!(
                "Translation run finished in {} ms: {}",
                report.elapsed_ms,
                report.summary()
            );
            RunState::Completed
        };

        Ok(RunOutcome {
            state,
            translations,
            report,
        })
    }
}
