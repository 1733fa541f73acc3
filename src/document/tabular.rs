/*!
 * Tabular document support: 2-D cell matrices backed by spreadsheet/XML
 * exports, with a header row, one source-text column, and zero or more
 * existing target-language columns.
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Extraction, Segment, Template};
use crate::errors::ExtractionError;

/// A spreadsheet-like document: header row plus data rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularDocument {
    /// Sheet name
    pub name: String,

    /// Header row (column titles)
    pub header: Vec<String>,

    /// Data rows; rows may be shorter than the header (trailing blanks)
    pub rows: Vec<Vec<String>>,

    /// Index of the column holding source text
    pub source_column: usize,

    /// Existing target-language columns, language tag to column index.
    /// BTreeMap keeps rebuild output deterministic.
    #[serde(default)]
    pub language_columns: BTreeMap<String, usize>,
}

impl TabularDocument {
    /// Create a tabular document with no pre-existing language columns.
    pub fn new(name: &str, header: Vec<String>, rows: Vec<Vec<String>>, source_column: usize) -> Self {
        Self {
            name: name.to_string(),
            header,
            rows,
            source_column,
            language_columns: BTreeMap::new(),
        }
    }

    /// Record an existing language column.
    pub fn with_language_column(mut self, language: &str, column: usize) -> Self {
        self.language_columns.insert(language.to_string(), column);
        self
    }

    /// Cell value at (row, column), empty string for short rows.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|c| c.as_str())
            .unwrap_or("")
    }
}

/// Template for a tabular document: a verbatim copy of every row plus the
/// segment id extracted from its source cell (if any).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularTemplate {
    /// Sheet name
    pub name: String,

    /// Header row copied verbatim
    pub header: Vec<String>,

    /// Source-text column index
    pub source_column: usize,

    /// Existing language columns present at extraction time
    pub language_columns: BTreeMap<String, usize>,

    /// One entry per data row, in order
    pub rows: Vec<TabularTemplateRow>,
}

/// One templated row: the original cells and the segment occupying the
/// source column, `None` when the row was skipped for blank source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularTemplateRow {
    /// Original cells, copied byte-for-byte
    pub cells: Vec<String>,

    /// Segment extracted from this row's source cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
}

/// Extract segments from the source column of every data row.
///
/// A row with blank source text is skipped entirely: no segment, no
/// placeholder, and rebuild leaves the row untouched.
pub(crate) fn extract(doc: &TabularDocument) -> Result<Extraction, ExtractionError> {
    if doc.header.is_empty() {
        return Err(ExtractionError::MalformedDocument(format!(
            "sheet '{}' has no header row",
            doc.name
        )));
    }
    if doc.source_column >= doc.header.len() {
        return Err(ExtractionError::MalformedDocument(format!(
            "sheet '{}': source column {} is outside the header (width {})",
            doc.name,
            doc.source_column,
            doc.header.len()
        )));
    }
    for (language, column) in &doc.language_columns {
        if *column >= doc.header.len() {
            return Err(ExtractionError::MalformedDocument(format!(
                "sheet '{}': language column '{}' at {} is outside the header (width {})",
                doc.name,
                language,
                column,
                doc.header.len()
            )));
        }
    }

    let mut segments = Vec::new();
    let mut template_rows = Vec::with_capacity(doc.rows.len());

    for (row_index, row) in doc.rows.iter().enumerate() {
        let source = doc.cell(row_index, doc.source_column);
        let segment_id = if source.trim().is_empty() {
            None
        } else {
            let segment = Segment::new(segments.len() + 1, source, None);
            let id = segment.id.clone();
            segments.push(segment);
            Some(id)
        };
        template_rows.push(TabularTemplateRow {
            cells: row.clone(),
            segment_id,
        });
    }

    Ok(Extraction {
        segments,
        template: Template::Tabular(TabularTemplate {
            name: doc.name.clone(),
            header: doc.header.clone(),
            source_column: doc.source_column,
            language_columns: doc.language_columns.clone(),
            rows: template_rows,
        }),
    })
}

/// Rebuild the sheet for one target language.
///
/// The target column is the language's existing column when the sheet already
/// had one, otherwise a fresh column appended after the header. For existing
/// columns the overwrite mode decides which cells are written; a fresh column
/// is always filled.
pub(crate) fn rebuild(
    template: &TabularTemplate,
    language: &str,
    resolve: &dyn Fn(&str) -> Option<String>,
    mode: crate::rebuild::OverwriteMode,
) -> TabularDocument {
    use crate::rebuild::OverwriteMode;

    let existing_column = template.language_columns.get(language).copied();
    let mut header = template.header.clone();
    let target_column = match existing_column {
        Some(column) => column,
        None => {
            header.push(language.to_string());
            header.len() - 1
        }
    };

    let mut rows = Vec::with_capacity(template.rows.len());
    for template_row in &template.rows {
        let mut cells = template_row.cells.clone();
        if let Some(segment_id) = &template_row.segment_id {
            let existing_value = cells.get(target_column).map(|c| c.as_str()).unwrap_or("");
            let write = match (existing_column, mode) {
                (None, _) => true,
                (Some(_), OverwriteMode::Keep) => false,
                (Some(_), OverwriteMode::FillEmpty) => existing_value.trim().is_empty(),
                (Some(_), OverwriteMode::OverwriteAll) => true,
            };
            if write {
                if let Some(text) = resolve(segment_id) {
                    while cells.len() <= target_column {
                        cells.push(String::new());
                    }
                    cells[target_column] = text;
                }
            }
        }
        rows.push(cells);
    }

    let mut language_columns = template.language_columns.clone();
    language_columns.insert(language.to_string(), target_column);

    TabularDocument {
        name: template.name.clone(),
        header,
        rows,
        source_column: template.source_column,
        language_columns,
    }
}
