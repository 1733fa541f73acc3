/*!
 * Document model for structured translation sources.
 *
 * The pipeline accepts four kinds of already-parsed documents, each with its
 * own extractor/rebuilder pair behind the common `Document`/`Template`
 * interface:
 *
 * - `tabular`: 2-D cell matrix with a header row and a source-text column
 * - `json`: JSON tree plus a schema naming the translatable leaf paths
 * - `text`: plain or HTML strings, split on markup boundaries
 * - `subtitle`: ordered cue list with timestamps
 *
 * Extraction walks a document and produces an ordered segment list plus a
 * template, the structural skeleton with placeholders that the rebuilder
 * later fills in per target language.
 */

use serde::{Deserialize, Serialize};

use crate::errors::ExtractionError;

pub mod json;
pub mod subtitle;
pub mod tabular;
pub mod text;

pub use json::{JsonDocument, JsonSchema, JsonTemplate};
pub use subtitle::{CueSlot, SubtitleCue, SubtitleDocument, SubtitleTemplate};
pub use tabular::{TabularDocument, TabularTemplate, TabularTemplateRow};
pub use text::{TextDocument, TextFlavor, TextTemplate};

/// One translatable unit of source text with a stable id.
///
/// Ids are assigned sequentially at extraction time (`T1`, `T2`, ...) and are
/// the join key between template, canonical-string membership, and externally
/// edited review tables. They must not change for the lifetime of a
/// document's translation/review cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Stable segment id, `T1`, `T2`, ...
    pub id: String,

    /// The source text to translate
    pub source_text: String,

    /// Structural path of the segment inside its document, when meaningful
    /// (JSON leaf path, subtitle cue index)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Segment {
    /// Create a segment with the given ordinal (1-based).
    pub(crate) fn new(ordinal: usize, source_text: &str, path: Option<String>) -> Self {
        Self {
            id: format!("T{}", ordinal),
            source_text: source_text.to_string(),
            path,
        }
    }
}

/// Reference to one segment occurrence within a multi-document run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentRef {
    /// Index of the document in the run's input list
    pub doc_index: usize,

    /// Segment id within that document
    pub segment_id: String,
}

/// Structural skeleton of a document with placeholders for segment ids.
///
/// Substitution is the only mutation a rebuild performs: every byte outside a
/// placeholder is copied unchanged into the rebuilt document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Template {
    Tabular(TabularTemplate),
    Json(JsonTemplate),
    Text(TextTemplate),
    Subtitle(SubtitleTemplate),
}

impl Template {
    /// The document kind this template rebuilds into.
    pub fn kind(&self) -> DocumentKind {
        match self {
            Template::Tabular(_) => DocumentKind::Tabular,
            Template::Json(_) => DocumentKind::Json,
            Template::Text(_) => DocumentKind::Text,
            Template::Subtitle(_) => DocumentKind::Subtitle,
        }
    }
}

/// Result of extracting a document: the ordered segments and the template
/// capable of reconstructing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// Segments in document order
    pub segments: Vec<Segment>,

    /// Structural skeleton with placeholders
    pub template: Template,
}

impl Extraction {
    /// Look up a segment's source text by id.
    pub fn source_text(&self, segment_id: &str) -> Option<&str> {
        self.segments
            .iter()
            .find(|s| s.id == segment_id)
            .map(|s| s.source_text.as_str())
    }
}

/// Supported document kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Tabular,
    Json,
    Text,
    Subtitle,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DocumentKind::Tabular => "tabular",
            DocumentKind::Json => "json",
            DocumentKind::Text => "text",
            DocumentKind::Subtitle => "subtitle",
        };
        write!(f, "{}", name)
    }
}

/// A structured document accepted by the pipeline.
///
/// Documents are immutable once loaded; the pipeline never mutates its input,
/// it produces fresh rebuilt documents per target language.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Document {
    Tabular(TabularDocument),
    Json(JsonDocument),
    Text(TextDocument),
    Subtitle(SubtitleDocument),
}

impl Document {
    /// The kind tag of this document.
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Tabular(_) => DocumentKind::Tabular,
            Document::Json(_) => DocumentKind::Json,
            Document::Text(_) => DocumentKind::Text,
            Document::Subtitle(_) => DocumentKind::Subtitle,
        }
    }

    /// Display name of the document (sheet name, schema name, file stem).
    pub fn name(&self) -> &str {
        match self {
            Document::Tabular(d) => &d.name,
            Document::Json(d) => &d.name,
            Document::Text(d) => &d.name,
            Document::Subtitle(d) => &d.name,
        }
    }

    /// Extract the ordered segment list and the rebuild template.
    ///
    /// Extraction is all-or-nothing per document: a structural problem fails
    /// the whole extraction with `ExtractionError::MalformedDocument`, before
    /// any provider call is made. Segments with empty or whitespace-only
    /// source text are never emitted.
    pub fn extract(&self) -> Result<Extraction, ExtractionError> {
        match self {
            Document::Tabular(d) => tabular::extract(d),
            Document::Json(d) => json::extract(d),
            Document::Text(d) => text::extract(d),
            Document::Subtitle(d) => subtitle::extract(d),
        }
    }
}

/// Format an inline placeholder marker for a segment id, `{T3}`.
pub(crate) fn placeholder(segment_id: &str) -> String {
    format!("{{{}}}", segment_id)
}
