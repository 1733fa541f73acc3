/*!
 * Deduplication of extracted segments into canonical strings.
 *
 * Segments from one or more documents are collapsed into unique canonical
 * strings so each distinct text is translated once per target language.
 * Do-not-translate entries and glossary-predefined strings stay in the
 * canonical list (occurrence accounting must add up) but are never
 * dispatched to a provider.
 *
 * This stage is a pure, total function of its inputs: the same segment list
 * and settings always produce the same canonical ids in the same order.
 */

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::document::{Extraction, SegmentRef};

/// Static glossary of predefined translations: source string to
/// (target language to translated text).
pub type Glossary = HashMap<String, HashMap<String, String>>;

/// How a canonical string is resolved during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    /// Dispatched to the provider
    Translate,

    /// Matches a do-not-translate entry; copied verbatim at rebuild time
    DoNotTranslate,

    /// Present in the glossary; resolved without any provider call
    Predefined,
}

/// A deduplicated unique source string shared by one or more segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalString {
    /// Deterministic id, a short hex digest of the key
    pub id: String,

    /// Normalized (trimmed) source text
    pub key: String,

    /// Every segment occurrence of this string, in first-seen order
    pub occurrences: Vec<SegmentRef>,

    /// How the string is resolved
    pub disposition: Disposition,
}

/// Result of a deduplication pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupReport {
    /// Canonical strings in first-occurrence order
    pub canonical: Vec<CanonicalString>,

    /// Total number of segments seen
    pub total_count: usize,

    /// Number of unique strings
    pub unique_count: usize,

    /// Duplicate occurrences avoided, per target language
    pub saved_count: usize,
}

impl DedupReport {
    /// Provider calls saved across a whole run of `language_count` targets.
    pub fn saved_for(&self, language_count: usize) -> usize {
        self.saved_count * language_count
    }

    /// Canonical strings that will be dispatched to a provider.
    pub fn translatable(&self) -> impl Iterator<Item = &CanonicalString> {
        self.canonical
            .iter()
            .filter(|c| c.disposition == Disposition::Translate)
    }
}

/// Settings consulted during deduplication.
#[derive(Debug, Clone, Default)]
pub struct DedupOptions {
    /// Exact-match strings excluded from translation
    pub do_not_translate: Vec<String>,

    /// Predefined translations resolved without a provider
    pub predefined_translations: Glossary,
}

/// Deterministic canonical id: first 12 hex chars of the key's SHA-256.
pub fn canonical_id(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut id = String::with_capacity(12);
    for byte in digest.iter().take(6) {
        id.push_str(&format!("{:02x}", byte));
    }
    id
}

/// Collapse the segments of one or more extractions into canonical strings.
///
/// The canonical key space is shared across all extractions, so identical
/// strings in different documents are translated once. Ordering follows the
/// first occurrence across the extraction list, which makes progress
/// counters reproducible across runs.
pub fn deduplicate(extractions: &[Extraction], options: &DedupOptions) -> DedupReport {
    let excluded: HashSet<String> = options
        .do_not_translate
        .iter()
        .map(|entry| entry.trim().to_string())
        .collect();

    let mut canonical: Vec<CanonicalString> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut total_count = 0;

    for (doc_index, extraction) in extractions.iter().enumerate() {
        for segment in &extraction.segments {
            let key = segment.source_text.trim().to_string();
            total_count += 1;

            let occurrence = SegmentRef {
                doc_index,
                segment_id: segment.id.clone(),
            };

            match index_by_key.get(&key) {
                Some(&index) => canonical[index].occurrences.push(occurrence),
                None => {
                    let disposition = if excluded.contains(&key) {
                        Disposition::DoNotTranslate
                    } else if options.predefined_translations.contains_key(&key) {
                        Disposition::Predefined
                    } else {
                        Disposition::Translate
                    };
                    index_by_key.insert(key.clone(), canonical.len());
                    canonical.push(CanonicalString {
                        id: canonical_id(&key),
                        key,
                        occurrences: vec![occurrence],
                        disposition,
                    });
                }
            }
        }
    }

    let unique_count = canonical.len();
    DedupReport {
        canonical,
        total_count,
        unique_count,
        saved_count: total_count - unique_count,
    }
}
