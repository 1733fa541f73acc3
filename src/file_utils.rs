use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::debug;
use walkdir::WalkDir;

use crate::document::{Document, DocumentKind, JsonDocument, JsonSchema, SubtitleDocument, TextDocument, TextFlavor};

// @module: File helpers for the CLI shell

/// File manager for document and artifact I/O
pub struct FileManager;

impl FileManager {
    /// Read a file into a string.
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Write a string to a file, creating parent directories as needed.
    pub fn write_string<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
    }

    /// Ensure a directory exists.
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))
    }

    /// Detect the document kind from a file extension.
    pub fn detect_document_kind<P: AsRef<Path>>(path: P) -> Option<DocumentKind> {
        let extension = path.as_ref().extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "srt" | "vtt" => Some(DocumentKind::Subtitle),
            "json" => Some(DocumentKind::Json),
            "txt" => Some(DocumentKind::Text),
            "html" | "htm" => Some(DocumentKind::Text),
            _ => None,
        }
    }

    /// Load a document from disk, decoding by extension.
    ///
    /// JSON payloads use a `<stem>.schema.json` sidecar when present and an
    /// inferred all-string-leaves schema otherwise.
    pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
        let path = path.as_ref();
        let kind = Self::detect_document_kind(path)
            .ok_or_else(|| anyhow!("Unsupported document type: {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let content = Self::read_to_string(path)?;

        let document = match kind {
            DocumentKind::Subtitle => Document::Subtitle(SubtitleDocument::parse_srt(&name, &content)?),
            DocumentKind::Json => {
                let root: serde_json::Value = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse JSON document: {}", path.display()))?;
                let schema_path = path.with_extension("schema.json");
                let schema = if schema_path.exists() {
                    let schema_content = Self::read_to_string(&schema_path)?;
                    serde_json::from_str::<JsonSchema>(&schema_content).with_context(|| {
                        format!("Failed to parse schema file: {}", schema_path.display())
                    })?
                } else {
                    debug!("No schema sidecar for {}, inferring string leaves", path.display());
                    JsonSchema::infer(&name, &root)
                };
                Document::Json(JsonDocument::new(&name, schema, root))
            }
            DocumentKind::Text => {
                let is_html = matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("html") | Some("htm")
                );
                if is_html {
                    Document::Text(TextDocument::with_flavor(&name, &content, TextFlavor::Html))
                } else {
                    Document::Text(TextDocument::new(&name, &content))
                }
            }
            DocumentKind::Tabular => {
                return Err(anyhow!(
                    "Tabular documents must be provided pre-parsed: {}",
                    path.display()
                ));
            }
        };
        Ok(document)
    }

    /// Filename for a document's review artifact.
    pub fn artifact_filename(name: &str) -> String {
        format!("{}.artifact.json", name)
    }

    /// Filename for a per-language review table; language identity is
    /// carried here, never in a cell.
    pub fn review_table_filename(name: &str, language: &str) -> String {
        format!("{}.review.{}.csv", name, language)
    }

    /// Parse `<stem>.review.<lang>.csv` back into (stem, language).
    pub fn parse_review_filename(filename: &str) -> Option<(String, String)> {
        let trimmed = filename.strip_suffix(".csv")?;
        let (stem, language) = trimmed.rsplit_once(".review.")?;
        if stem.is_empty() || language.is_empty() {
            return None;
        }
        Some((stem.to_string(), language.to_string()))
    }

    /// Filename for a rebuilt output document.
    pub fn output_filename(name: &str, language: &str, kind: DocumentKind) -> String {
        let extension = match kind {
            DocumentKind::Subtitle => "srt",
            DocumentKind::Json => "json",
            DocumentKind::Text => "txt",
            DocumentKind::Tabular => "csv",
        };
        format!("{}.{}.{}", name, language, extension)
    }

    /// Collect review tables under a directory, keyed by language.
    pub fn collect_review_tables<P: AsRef<Path>>(dir: P) -> Result<Vec<(String, String, PathBuf)>> {
        let mut tables = Vec::new();
        for entry in WalkDir::new(dir.as_ref()).max_depth(2) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let filename = entry.file_name().to_string_lossy();
            if let Some((stem, language)) = Self::parse_review_filename(&filename) {
                tables.push((stem, language, entry.path().to_path_buf()));
            }
        }
        tables.sort();
        Ok(tables)
    }
}
