/*!
 * End-to-end batch pipeline: extraction, deduplication, controlled
 * translation, and per-language rebuild over one or more documents.
 *
 * Extraction and deduplication failures surface synchronously before any
 * provider call is made, so malformed input never wastes API usage. The
 * translation phase accumulates per-language outcomes instead of failing the
 * run, and the rebuild phase fans one canonical result out to every document
 * that contained the string.
 */

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use crate::app_config::{Config, RequestPacing};
use crate::dedup::{deduplicate, DedupOptions, DedupReport, Glossary};
use crate::document::{Document, Extraction};
use crate::errors::AppError;
use crate::providers::{ProviderOptions, TranslationProvider};
use crate::rebuild::{expand_to_segments, rebuild_document, OverwriteMode, SegmentTranslations};
use crate::review::ReviewArtifact;
use crate::translation::{
    ControlToken, Phase, ProgressObserver, ProgressReporter, RunOutcome, RunReport, RunRequest,
    RunState, TranslationController,
};

/// Settings threaded through one pipeline run.
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Source language of every document in the run
    pub source_language: String,

    /// Target languages, processed sequentially
    pub target_languages: Vec<String>,

    /// Exact-match strings excluded from translation
    pub do_not_translate: Vec<String>,

    /// Predefined translations resolved without a provider
    pub glossary: Glossary,

    /// Inter-request pacing preset
    pub pacing: RequestPacing,

    /// Options forwarded to every provider call
    pub provider_options: ProviderOptions,

    /// Per-language overwrite policy for pre-existing content
    pub overwrite_modes: HashMap<String, OverwriteMode>,
}

impl TranslateOptions {
    /// Build run options from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_language: config.source_language.clone(),
            target_languages: config.target_languages.clone(),
            do_not_translate: config.do_not_translate.clone(),
            glossary: config.glossary.clone(),
            pacing: config.pacing,
            provider_options: config.provider_options(),
            overwrite_modes: config.overwrite_modes.clone(),
        }
    }
}

/// Per-document result of a pipeline run.
pub struct TranslatedDocument {
    /// Source document name
    pub name: String,

    /// One rebuilt document per completed target language
    pub outputs: HashMap<String, Document>,

    /// Durable artifact for the review round trip
    pub artifact: ReviewArtifact,
}

/// Result of a whole pipeline run.
pub struct PipelineOutput {
    /// `Completed` or `Cancelled`
    pub state: RunState,

    /// Per-document outputs, in input order
    pub documents: Vec<TranslatedDocument>,

    /// Deduplication statistics for the run
    pub dedup: DedupReport,

    /// Per-language translation accounting
    pub report: RunReport,
}

/// Orchestrates the full pipeline against an injected provider.
pub struct BatchPipeline {
    controller: TranslationController,
}

impl BatchPipeline {
    /// Create a pipeline for the given provider.
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            controller: TranslationController::new(provider),
        }
    }

    /// Attach a translation memory consulted before each provider call.
    pub fn with_memory(mut self, memory: Arc<dyn crate::translation::TranslationMemory>) -> Self {
        self.controller = self.controller.with_memory(memory);
        self
    }

    /// Run the pipeline over the given documents.
    ///
    /// Returns one rebuilt document per (document, completed language) plus a
    /// review artifact per document. A cancelled run yields only the
    /// languages that fully completed before the cancellation was observed.
    pub async fn run(
        &self,
        documents: &[Document],
        options: &TranslateOptions,
        token: ControlToken,
        observer: Option<ProgressObserver>,
    ) -> Result<PipelineOutput, AppError> {
        let progress = ProgressReporter::new(observer);

        // Extraction is all-or-nothing per document and happens before any
        // provider call
        progress.update(|state| state.phase = Phase::Extracting);
        let mut extractions = Vec::with_capacity(documents.len());
        for document in documents {
            let extraction = document.extract()?;
            debug!(
                "extracted {} segments from '{}'",
                extraction.segments.len(),
                document.name()
            );
            extractions.push(extraction);
        }

        progress.update(|state| state.phase = Phase::Deduplicating);
        let dedup = deduplicate(
            &extractions,
            &DedupOptions {
                do_not_translate: options.do_not_translate.clone(),
                predefined_translations: options.glossary.clone(),
            },
        );
        info!(
            "{} segments across {} documents, {} unique, {} duplicate lookups saved per language",
            dedup.total_count,
            documents.len(),
            dedup.unique_count,
            dedup.saved_count
        );

        let outcome = self
            .controller
            .run(
                RunRequest {
                    dedup: &dedup,
                    source_language: &options.source_language,
                    target_languages: &options.target_languages,
                    glossary: &options.glossary,
                    pacing: options.pacing,
                    provider_options: &options.provider_options,
                },
                token,
                &progress,
            )
            .await?;

        progress.update(|state| state.phase = Phase::Rebuilding);
        let documents_out = self.rebuild_all(documents, &extractions, &dedup, &outcome, options);

        progress.update(|state| state.phase = Phase::Done);
        Ok(PipelineOutput {
            state: outcome.state,
            documents: documents_out,
            dedup,
            report: outcome.report,
        })
    }

    fn rebuild_all(
        &self,
        documents: &[Document],
        extractions: &[Extraction],
        dedup: &DedupReport,
        outcome: &RunOutcome,
        options: &TranslateOptions,
    ) -> Vec<TranslatedDocument> {
        // language -> per-document segment maps, one expansion per language
        let mut segment_maps: HashMap<&str, Vec<SegmentTranslations>> = HashMap::new();
        for (language, canonical_texts) in &outcome.translations {
            segment_maps.insert(
                language.as_str(),
                expand_to_segments(&dedup.canonical, canonical_texts, documents.len()),
            );
        }

        let mut results = Vec::with_capacity(documents.len());
        for (doc_index, (document, extraction)) in
            documents.iter().zip(extractions.iter()).enumerate()
        {
            let mut outputs = HashMap::new();
            let mut machine: HashMap<String, HashMap<String, String>> = HashMap::new();

            for (language, maps) in &segment_maps {
                let translations = &maps[doc_index];
                let mode = options
                    .overwrite_modes
                    .get(*language)
                    .copied()
                    .unwrap_or_default();
                outputs.insert(
                    (*language).to_string(),
                    rebuild_document(
                        &extraction.template,
                        &extraction.segments,
                        translations,
                        language,
                        mode,
                    ),
                );
                machine.insert((*language).to_string(), translations.clone());
            }

            let schema_or_sheet = match document {
                Document::Tabular(d) => Some(d.name.clone()),
                Document::Json(d) => Some(d.schema.name.clone()),
                _ => None,
            };
            results.push(TranslatedDocument {
                name: document.name().to_string(),
                outputs,
                artifact: ReviewArtifact::new(
                    document.name(),
                    schema_or_sheet,
                    extraction.template.clone(),
                    extraction.segments.clone(),
                    machine,
                ),
            });
        }
        results
    }
}
