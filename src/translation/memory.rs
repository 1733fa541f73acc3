/*!
 * Translation memory: exact-match lookup consulted before the provider.
 *
 * A hit removes the string from the provider's workload and is counted as a
 * saved call. Fresh provider results are stored back so later languages and
 * later runs benefit.
 */

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

/// Exact-match translation memory consulted before each provider call.
pub trait TranslationMemory: Send + Sync {
    /// Look up a previous translation of `source_text` into `target_language`.
    fn lookup(&self, source_text: &str, source_language: &str, target_language: &str) -> Option<String>;

    /// Record a fresh translation.
    fn store(&self, source_text: &str, source_language: &str, target_language: &str, translation: &str);
}

/// Memory key combining source text, source language, and target language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoryKey {
    source_text: String,
    source_language: String,
    target_language: String,
}

impl MemoryKey {
    fn new(source_text: &str, source_language: &str, target_language: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }
}

/// In-memory translation memory with hit/miss statistics.
pub struct InMemoryTranslationMemory {
    /// Internal storage
    entries: Arc<RwLock<HashMap<MemoryKey, String>>>,

    /// Lookup hit counter
    hits: Arc<RwLock<usize>>,

    /// Lookup miss counter
    misses: Arc<RwLock<usize>>,
}

impl InMemoryTranslationMemory {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
        }
    }

    /// Get memory statistics as (hits, misses, hit rate).
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the memory holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop all entries and reset statistics.
    pub fn clear(&self) {
        self.entries.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;
        debug!("Translation memory cleared");
    }
}

impl Default for InMemoryTranslationMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationMemory for InMemoryTranslationMemory {
    fn lookup(&self, source_text: &str, source_language: &str, target_language: &str) -> Option<String> {
        let key = MemoryKey::new(source_text, source_language, target_language);
        let entries = self.entries.read();

        match entries.get(&key) {
            Some(translation) => {
                *self.hits.write() += 1;
                debug!(
                    "Memory hit for '{}' ({} -> {})",
                    truncate_text(source_text, 30),
                    source_language,
                    target_language
                );
                Some(translation.clone())
            }
            None => {
                *self.misses.write() += 1;
                None
            }
        }
    }

    fn store(&self, source_text: &str, source_language: &str, target_language: &str, translation: &str) {
        let key = MemoryKey::new(source_text, source_language, target_language);
        self.entries.write().insert(key, translation.to_string());
    }
}

/// Truncate text to a maximum length with ellipsis
fn truncate_text(text: &str, max_length: usize) -> String {
    if text.len() <= max_length {
        text.to_string()
    } else {
        let cut = text
            .char_indices()
            .take_while(|(index, _)| *index < max_length)
            .last()
            .map(|(index, c)| index + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &text[..cut])
    }
}
