/*!
 * Review round trip: export machine translations for human correction and
 * re-apply edited tables deterministically.
 *
 * After a first rebuild, the template and segment list are persisted as a
 * durable artifact, together with a flat per-language review table (columns
 * `ID, (Path,) Source, Translation, Correction`). Re-import builds a
 * translation map with corrections taking precedence, forces overwrite-all
 * for every language present in the edited tables, and invokes the rebuilder
 * again through the same template.
 */

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::document::{Document, Segment, Template};
use crate::errors::ReviewError;
use crate::rebuild::{rebuild_document, OverwriteMode, SegmentTranslations};

/// Durable artifact enabling later re-import of human corrections.
///
/// One artifact is exported per document; segment ids inside it must match
/// the review tables for the round trip to line up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewArtifact {
    /// Document name the artifact was exported from
    pub name: String,

    /// Schema or sheet name, when the document kind has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_or_sheet: Option<String>,

    /// Structural skeleton captured at extraction time
    pub template: Template,

    /// Segments with source text, in extraction order
    pub segments: Vec<Segment>,

    /// Machine translations baked in at export time:
    /// language -> segment id -> text
    pub machine: HashMap<String, HashMap<String, String>>,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,
}

impl ReviewArtifact {
    /// Assemble an artifact from a finished translation pass.
    pub fn new(
        name: &str,
        schema_or_sheet: Option<String>,
        template: Template,
        segments: Vec<Segment>,
        machine: HashMap<String, HashMap<String, String>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            schema_or_sheet,
            template,
            segments,
            machine,
            exported_at: Utc::now(),
        }
    }

    /// Serialize to pretty JSON for storage.
    pub fn to_json(&self) -> Result<String, ReviewError> {
        serde_json::to_string_pretty(self).map_err(|e| ReviewError::Artifact(e.to_string()))
    }

    /// Deserialize from stored JSON.
    pub fn from_json(content: &str) -> Result<Self, ReviewError> {
        serde_json::from_str(content).map_err(|e| ReviewError::Artifact(e.to_string()))
    }

    /// Whether any segment carries a structural path (controls the optional
    /// `Path` column of review tables).
    pub fn has_paths(&self) -> bool {
        self.segments.iter().any(|s| s.path.is_some())
    }

    /// Languages with machine translations baked into the artifact.
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.machine.keys().map(|k| k.as_str()).collect();
        languages.sort_unstable();
        languages
    }

    /// Write the reviewable table for one language.
    ///
    /// Columns are `ID, (Path,) Source, Translation, Correction`; language
    /// identity is carried by the caller's filename, not in a cell.
    pub fn write_review_table<W: Write>(&self, writer: W, language: &str) -> Result<(), ReviewError> {
        let machine = self.machine.get(language);
        let with_path = self.has_paths();

        let mut table = csv::Writer::from_writer(writer);
        let header: Vec<&str> = if with_path {
            vec!["ID", "Path", "Source", "Translation", "Correction"]
        } else {
            vec!["ID", "Source", "Translation", "Correction"]
        };
        table
            .write_record(&header)
            .map_err(|e| ReviewError::Table(e.to_string()))?;

        for segment in &self.segments {
            let translation = machine
                .and_then(|m| m.get(&segment.id))
                .map(|t| t.as_str())
                .unwrap_or("");
            let record: Vec<&str> = if with_path {
                vec![
                    &segment.id,
                    segment.path.as_deref().unwrap_or(""),
                    &segment.source_text,
                    translation,
                    "",
                ]
            } else {
                vec![&segment.id, &segment.source_text, translation, ""]
            };
            table
                .write_record(&record)
                .map_err(|e| ReviewError::Table(e.to_string()))?;
        }
        table.flush().map_err(|e| ReviewError::Table(e.to_string()))?;
        Ok(())
    }
}

/// One row of an edited review table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRow {
    /// Segment id (`T1`, `T2`, ...)
    pub id: String,

    /// Structural path, when the table carries one
    pub path: Option<String>,

    /// Source text as exported
    pub source: String,

    /// Machine translation as exported
    pub translation: String,

    /// Human correction, empty when the reviewer left the row alone
    pub correction: Option<String>,
}

/// Parse an edited review table.
///
/// Column lookup is by header name, so reordered or extra columns survive a
/// spreadsheet round trip.
pub fn read_review_table<R: Read>(reader: R) -> Result<Vec<ReviewRow>, ReviewError> {
    let mut table = csv::Reader::from_reader(reader);
    let headers = table
        .headers()
        .map_err(|e| ReviewError::Table(e.to_string()))?
        .clone();

    let column = |name: &str| -> Option<usize> {
        headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    };
    let id_column = column("ID").ok_or_else(|| ReviewError::MissingColumn("ID".to_string()))?;
    let source_column =
        column("Source").ok_or_else(|| ReviewError::MissingColumn("Source".to_string()))?;
    let translation_column = column("Translation")
        .ok_or_else(|| ReviewError::MissingColumn("Translation".to_string()))?;
    let correction_column = column("Correction")
        .ok_or_else(|| ReviewError::MissingColumn("Correction".to_string()))?;
    let path_column = column("Path");

    let mut rows = Vec::new();
    for record in table.records() {
        let record = record.map_err(|e| ReviewError::Table(e.to_string()))?;
        let field = |index: usize| record.get(index).unwrap_or("").to_string();

        let correction = field(correction_column);
        rows.push(ReviewRow {
            id: field(id_column),
            path: path_column.map(|index| field(index)).filter(|p| !p.is_empty()),
            source: field(source_column),
            translation: field(translation_column),
            correction: if correction.trim().is_empty() {
                None
            } else {
                Some(correction)
            },
        });
    }
    Ok(rows)
}

/// Re-apply edited review tables through the stored template.
///
/// For every language present in `tables`, the translation used per segment
/// is `correction ?? translation ?? machine text baked into the artifact`,
/// and the rebuild is forced to overwrite-all: a correction always wins over
/// whatever was previously in the cell. Rows whose id is not in the artifact
/// are ignored silently; this is a best-effort recovery path for stale
/// exports.
pub fn apply_review(
    artifact: &ReviewArtifact,
    tables: &HashMap<String, Vec<ReviewRow>>,
) -> HashMap<String, Document> {
    let known_ids: HashSet<&str> = artifact.segments.iter().map(|s| s.id.as_str()).collect();

    let mut rebuilt = HashMap::new();
    for (language, rows) in tables {
        let mut translations: SegmentTranslations = artifact
            .machine
            .get(language)
            .cloned()
            .unwrap_or_default();

        let mut stale = 0;
        for row in rows {
            if !known_ids.contains(row.id.as_str()) {
                stale += 1;
                continue;
            }
            let text = row
                .correction
                .clone()
                .or_else(|| {
                    if row.translation.is_empty() {
                        None
                    } else {
                        Some(row.translation.clone())
                    }
                });
            if let Some(text) = text {
                translations.insert(row.id.clone(), text);
            }
        }
        if stale > 0 {
            warn!(
                "{}: ignored {} review rows with ids not present in the stored artifact",
                language, stale
            );
        }
        debug!("{}: applying {} reviewed translations", language, translations.len());

        rebuilt.insert(
            language.clone(),
            rebuild_document(
                &artifact.template,
                &artifact.segments,
                &translations,
                language,
                OverwriteMode::OverwriteAll,
            ),
        );
    }
    rebuilt
}
