/*!
 * Progress reporting for translation runs.
 *
 * `ProgressState` is written exclusively by the controller and read by
 * observers through a callback; the discipline is write-then-notify, so no
 * locking beyond the state lock itself is needed. Counters are expressed in
 * canonical-string-by-language units, matching what a provider actually
 * bills, not raw segment occurrences.
 */

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Pipeline phase for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Extracting,
    Deduplicating,
    Translating,
    Rebuilding,
    Done,
}

/// Snapshot of a run's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressState {
    /// Jobs finished so far (canonical strings × languages)
    pub current: usize,

    /// Total jobs for the run
    pub total: usize,

    /// Language currently being translated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_language: Option<String>,

    /// Current pipeline phase
    pub phase: Phase,

    /// Whether the run is paused
    pub paused: bool,

    /// Whether the run has been cancelled
    pub cancelled: bool,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            current: 0,
            total: 0,
            current_language: None,
            phase: Phase::Idle,
            paused: false,
            cancelled: false,
        }
    }
}

/// Observer callback invoked after every mutation with a fresh snapshot.
pub type ProgressObserver = Arc<dyn Fn(&ProgressState) + Send + Sync>;

/// Owner of the shared progress state.
pub struct ProgressReporter {
    state: Arc<RwLock<ProgressState>>,
    observer: Option<ProgressObserver>,
}

impl ProgressReporter {
    /// Create a reporter with an optional observer.
    pub fn new(observer: Option<ProgressObserver>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ProgressState::default())),
            observer,
        }
    }

    /// Current snapshot of the progress state.
    pub fn snapshot(&self) -> ProgressState {
        self.state.read().clone()
    }

    /// Mutate the state, then notify the observer with the new snapshot.
    pub(crate) fn update(&self, mutate: impl FnOnce(&mut ProgressState)) {
        let snapshot = {
            let mut state = self.state.write();
            mutate(&mut state);
            state.clone()
        };
        if let Some(observer) = &self.observer {
            observer(&snapshot);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(None)
    }
}
