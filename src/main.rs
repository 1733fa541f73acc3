// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::app_config::{Config, LogLevel, RequestPacing};
use crate::document::Document;
use crate::file_utils::FileManager;
use crate::pipeline::{BatchPipeline, TranslateOptions};
use crate::providers::PseudoProvider;
use crate::review::{apply_review, read_review_table, ReviewArtifact};
use crate::translation::{ControlToken, InMemoryTranslationMemory, Phase, ProgressState, RunState};

mod app_config;
mod dedup;
mod document;
mod errors;
mod file_utils;
mod language_utils;
mod pipeline;
mod providers;
mod rebuild;
mod review;
mod translation;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI wrapper for RequestPacing to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliPacing {
    Fast,
    Balanced,
    Reliable,
}

impl From<CliPacing> for RequestPacing {
    fn from(cli_pacing: CliPacing) -> Self {
        match cli_pacing {
            CliPacing::Fast => RequestPacing::Fast,
            CliPacing::Balanced => RequestPacing::Balanced,
            CliPacing::Reliable => RequestPacing::Reliable,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate documents into the configured target languages (offline
    /// pseudo-translation; vendor providers are injected by embedders)
    Translate(TranslateArgs),

    /// Write per-language review tables from a stored artifact
    ExportReview(ExportReviewArgs),

    /// Re-apply edited review tables through a stored artifact
    ApplyReview(ApplyReviewArgs),
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input documents (srt, json, txt, html)
    #[arg(value_name = "INPUT_FILES", required = true)]
    input_files: Vec<PathBuf>,

    /// Output directory for rebuilt documents and artifacts
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Comma-separated target language tags (overrides config)
    #[arg(short, long, value_delimiter = ',')]
    to: Vec<String>,

    /// Source language tag (overrides config)
    #[arg(short, long)]
    source_language: Option<String>,

    /// Inter-request pacing preset
    #[arg(short, long, value_enum)]
    pacing: Option<CliPacing>,
}

#[derive(Parser, Debug)]
struct ExportReviewArgs {
    /// Review artifact written by a translate run
    #[arg(value_name = "ARTIFACT")]
    artifact: PathBuf,

    /// Languages to export (defaults to every language in the artifact)
    #[arg(short, long, value_delimiter = ',')]
    languages: Vec<String>,

    /// Output directory for review tables
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ApplyReviewArgs {
    /// Review artifact written by a translate run
    #[arg(value_name = "ARTIFACT")]
    artifact: PathBuf,

    /// Directory holding edited `<name>.review.<lang>.csv` tables
    #[arg(value_name = "TABLES_DIR")]
    tables_dir: PathBuf,

    /// Output directory for rebuilt documents
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,
}

/// transloom - batch structured-document translation
///
/// Extracts translatable text from structured documents, deduplicates it,
/// translates each unique string once per target language, and rebuilds
/// faithful per-language output. Human corrections can be re-applied later
/// through the stored review artifact.
#[derive(Parser, Debug)]
#[command(name = "transloom")]
#[command(version)]
#[command(about = "Batch document translation pipeline")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "transloom.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = match record.level() {
                Level::Error => writeln!(stderr, "\x1B[1;31m{} ERROR {}\x1B[0m", now, record.args()),
                Level::Warn => writeln!(stderr, "\x1B[1;33m{} WARN  {}\x1B[0m", now, record.args()),
                Level::Info => writeln!(stderr, "{} INFO  {}", now, record.args()),
                _ => writeln!(stderr, "\x1B[2m{} {} {}\x1B[0m", now, record.level(), record.args()),
            };
        }
    }

    fn flush(&self) {}
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = CommandLineOptions::parse();

    let mut config = if std::path::Path::new(&options.config_path).exists() {
        Config::from_file(&options.config_path)?
    } else {
        Config::default()
    };
    if let Some(level) = options.log_level {
        config.log_level = level.into();
    }
    CustomLogger::init(config.log_level.to_level_filter())
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    match options.command {
        Commands::Translate(args) => run_translate(config, args).await,
        Commands::ExportReview(args) => run_export_review(args),
        Commands::ApplyReview(args) => run_apply_review(args),
    }
}

async fn run_translate(mut config: Config, args: TranslateArgs) -> Result<()> {
    if let Some(source) = args.source_language {
        config.source_language = source;
    }
    if !args.to.is_empty() {
        config.target_languages = args.to;
    }
    if let Some(pacing) = args.pacing {
        config.pacing = pacing.into();
    }
    config.validate()?;

    let mut documents = Vec::with_capacity(args.input_files.len());
    for path in &args.input_files {
        documents.push(FileManager::load_document(path)?);
    }
    info!(
        "Translating {} document(s) into {} language(s)",
        documents.len(),
        config.target_languages.len()
    );

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    let bar = progress_bar.clone();
    let observer = Arc::new(move |state: &ProgressState| {
        bar.set_length(state.total as u64);
        bar.set_position(state.current as u64);
        let phase = match state.phase {
            Phase::Translating => state.current_language.clone().unwrap_or_default(),
            phase => format!("{:?}", phase).to_lowercase(),
        };
        bar.set_message(phase);
    });

    let pipeline = BatchPipeline::new(Arc::new(PseudoProvider::new()))
        .with_memory(Arc::new(InMemoryTranslationMemory::new()));
    let output = pipeline
        .run(
            &documents,
            &TranslateOptions::from_config(&config),
            ControlToken::unsupervised(),
            Some(observer),
        )
        .await
        .map_err(|e| anyhow!("{}", e))?;
    progress_bar.finish_and_clear();

    if output.state == RunState::Cancelled {
        warn!("Run was cancelled; writing completed languages only");
    }
    info!(
        "Deduplication: {} total, {} unique, {} duplicate lookups saved per language",
        output.dedup.total_count, output.dedup.unique_count, output.dedup.saved_count
    );
    info!("{}", output.report.summary());
    for language in output.report.failed_languages() {
        warn!("Language {} finished with failures", language);
    }

    FileManager::ensure_dir(&args.output_dir)?;
    for translated in &output.documents {
        for (language, document) in &translated.outputs {
            let filename =
                FileManager::output_filename(&translated.name, language, document.kind());
            let path = args.output_dir.join(filename);
            FileManager::write_string(&path, &render_document(document)?)?;
            info!("Wrote {}", path.display());
        }

        let artifact_path = args
            .output_dir
            .join(FileManager::artifact_filename(&translated.name));
        FileManager::write_string(&artifact_path, &translated.artifact.to_json()?)?;

        for language in translated.artifact.languages() {
            let table_path = args
                .output_dir
                .join(FileManager::review_table_filename(&translated.name, language));
            let file = File::create(&table_path)
                .with_context(|| format!("Failed to create review table: {}", table_path.display()))?;
            translated.artifact.write_review_table(file, language)?;
        }
    }
    Ok(())
}

fn run_export_review(args: ExportReviewArgs) -> Result<()> {
    let artifact = ReviewArtifact::from_json(&FileManager::read_to_string(&args.artifact)?)?;
    let languages: Vec<String> = if args.languages.is_empty() {
        artifact.languages().iter().map(|l| l.to_string()).collect()
    } else {
        args.languages
    };

    FileManager::ensure_dir(&args.output_dir)?;
    for language in &languages {
        let table_path = args
            .output_dir
            .join(FileManager::review_table_filename(&artifact.name, language));
        let file = File::create(&table_path)
            .with_context(|| format!("Failed to create review table: {}", table_path.display()))?;
        artifact.write_review_table(file, language)?;
        info!("Wrote {}", table_path.display());
    }
    Ok(())
}

fn run_apply_review(args: ApplyReviewArgs) -> Result<()> {
    let artifact = ReviewArtifact::from_json(&FileManager::read_to_string(&args.artifact)?)?;

    let mut tables = HashMap::new();
    for (stem, language, path) in FileManager::collect_review_tables(&args.tables_dir)? {
        if stem != artifact.name {
            continue;
        }
        let file = File::open(&path)
            .with_context(|| format!("Failed to open review table: {}", path.display()))?;
        let rows = read_review_table(file)?;
        info!("Loaded {} rows for {} from {}", rows.len(), language, path.display());
        tables.insert(language, rows);
    }
    if tables.is_empty() {
        return Err(anyhow!(
            "No review tables for '{}' found in {}",
            artifact.name,
            args.tables_dir.display()
        ));
    }

    FileManager::ensure_dir(&args.output_dir)?;
    for (language, document) in apply_review(&artifact, &tables) {
        let filename = FileManager::output_filename(&artifact.name, &language, document.kind());
        let path = args.output_dir.join(filename);
        FileManager::write_string(&path, &render_document(&document)?)?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

/// Serialize a rebuilt document for writing to disk.
fn render_document(document: &Document) -> Result<String> {
    Ok(match document {
        Document::Subtitle(d) => d.to_srt_string(),
        Document::Json(d) => serde_json::to_string_pretty(&d.root)?,
        Document::Text(d) => d.content.clone(),
        Document::Tabular(d) => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(&d.header)?;
            for row in &d.rows {
                writer.write_record(row)?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e))?;
            String::from_utf8(bytes)?
        }
    })
}
