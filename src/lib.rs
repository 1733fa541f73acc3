/*!
 * # transloom - Batch Structured-Document Translation
 *
 * A Rust library for batch-translating structured documents into many target
 * languages through pluggable translation providers.
 *
 * ## Features
 *
 * - Extract translatable segments from tabular, JSON, text/HTML, and
 *   subtitle documents
 * - Deduplicate identical strings across one or many documents so each is
 *   translated once per language
 * - Controlled execution: pausable, cancellable, rate-paced, one outstanding
 *   provider request at a time
 * - Deterministic rebuild that preserves every structural byte outside the
 *   translated slots
 * - Review round trip: export per-language correction tables, re-apply the
 *   edited tables through the stored template
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Document model with per-kind extractor/rebuilder pairs
 * - `dedup`: Canonical-string deduplication
 * - `translation`: Controlled translation runs:
 *   - `translation::controller`: per-language job sequencing
 *   - `translation::control`: pause/resume/cancel token
 *   - `translation::progress`: progress state and observer callbacks
 *   - `translation::memory`: exact-match translation memory
 * - `providers`: Provider capability trait plus offline implementations
 * - `rebuild`: Canonical-result expansion and per-language reconstruction
 * - `review`: Review artifact and correction-table round trip
 * - `pipeline`: End-to-end orchestration over one or more documents
 * - `file_utils`: File system operations for the CLI shell
 * - `language_utils`: Language tag utilities
 * - `errors`: Custom error types for the pipeline
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod dedup;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod rebuild;
pub mod review;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, RequestPacing};
pub use dedup::{deduplicate, CanonicalString, DedupOptions, DedupReport, Disposition, Glossary};
pub use document::{Document, DocumentKind, Extraction, Segment, SegmentRef, Template};
pub use errors::{AppError, ExtractionError, ProviderError, ReviewError};
pub use pipeline::{BatchPipeline, PipelineOutput, TranslateOptions, TranslatedDocument};
pub use providers::{ContentMode, Formality, ProviderOptions, TranslationProvider};
pub use rebuild::{expand_to_segments, rebuild_document, OverwriteMode, SegmentTranslations};
pub use review::{apply_review, read_review_table, ReviewArtifact, ReviewRow};
pub use translation::{
    ControlHandle, ControlToken, InMemoryTranslationMemory, LanguageOutcome, Phase,
    ProgressObserver, ProgressReporter, ProgressState, RunReport, RunState, TranslationController,
    TranslationMemory,
};
