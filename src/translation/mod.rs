/*!
 * Translation run machinery.
 *
 * This module owns the controlled-execution half of the pipeline:
 *
 * - `controller`: sequences jobs per language against a provider
 * - `control`: pause/resume/cancel token observed at suspension points
 * - `progress`: shared progress state and observer notification
 * - `memory`: exact-match translation memory consulted before the provider
 */

pub mod control;
pub mod controller;
pub mod memory;
pub mod progress;

pub use control::{ControlHandle, ControlToken, RunState};
pub use controller::{LanguageOutcome, RunOutcome, RunReport, RunRequest, TranslationController};
pub use memory::{InMemoryTranslationMemory, TranslationMemory};
pub use progress::{Phase, ProgressObserver, ProgressReporter, ProgressState};
