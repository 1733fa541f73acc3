/*!
 * Deterministic document reconstruction from a template.
 *
 * The rebuilder walks a template and substitutes placeholders with
 * target-language text; that substitution is the only mutation it performs,
 * so every byte outside a placeholder is copied unchanged. Canonical-level
 * translation results are expanded to per-segment maps first, so the
 * rebuilder itself never needs to know about deduplication.
 */

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::dedup::CanonicalString;
use crate::document::{json, subtitle, tabular, text, Document, Segment, Template};

/// Per-language policy for a target language that already has content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwriteMode {
    /// Never touch existing cells
    Keep,

    /// Translate only where the existing cell is blank
    #[default]
    FillEmpty,

    /// Replace regardless of existing content
    OverwriteAll,
}

/// Per-segment translations for one language: segment id to text.
pub type SegmentTranslations = HashMap<String, String>;

/// Expand canonical-level results for one language back to every segment
/// occurrence, per document.
///
/// Returns one map per document index. Canonical strings without a resolved
/// text (do-not-translate, failed) simply have no entry; the rebuilder falls
/// back to source text for those.
pub fn expand_to_segments(
    canonical: &[CanonicalString],
    canonical_texts: &HashMap<String, String>,
    document_count: usize,
) -> Vec<SegmentTranslations> {
    let mut maps: Vec<SegmentTranslations> = vec![HashMap::new(); document_count];
    for entry in canonical {
        let Some(resolved) = canonical_texts.get(&entry.id) else {
            continue;
        };
        for occurrence in &entry.occurrences {
            if let Some(map) = maps.get_mut(occurrence.doc_index) {
                map.insert(occurrence.segment_id.clone(), resolved.clone());
            } else {
                warn!(
                    "occurrence of '{}' references document {} outside the run",
                    entry.key, occurrence.doc_index
                );
            }
        }
    }
    maps
}

/// Rebuild one document for one target language.
///
/// Placeholder resolution order is: the translated text for the segment,
/// falling back to the segment's source text when no translation exists.
/// The overwrite mode applies to document kinds that carry existing
/// per-language content (tabular language columns).
pub fn rebuild_document(
    template: &Template,
    segments: &[Segment],
    translations: &SegmentTranslations,
    language: &str,
    mode: OverwriteMode,
) -> Document {
    let source_by_id: HashMap<&str, &str> = segments
        .iter()
        .map(|s| (s.id.as_str(), s.source_text.as_str()))
        .collect();

    let resolve = |segment_id: &str| -> Option<String> {
        if let Some(text) = translations.get(segment_id) {
            return Some(text.clone());
        }
        match source_by_id.get(segment_id) {
            Some(source) => Some((*source).to_string()),
            None => {
                warn!("template references unknown segment '{}'", segment_id);
                None
            }
        }
    };

    match template {
        Template::Tabular(t) => Document::Tabular(tabular::rebuild(t, language, &resolve, mode)),
        Template::Json(t) => Document::Json(json::rebuild(t, segments, &resolve)),
        Template::Text(t) => Document::Text(text::rebuild(t, &resolve)),
        Template::Subtitle(t) => Document::Subtitle(subtitle::rebuild(t, &resolve)),
    }
}
