/*!
 * Cooperative pause/resume/cancel control for a translation run.
 *
 * The caller keeps a `ControlHandle`; the controller holds the matching
 * `ControlToken` and observes flag flips only at its suspension points (the
 * inter-request delay and the wait-until-resumed point). Resume is a watch
 * notification, not a busy poll.
 */

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Lifecycle of a translation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    /// Whether the run can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Cancelled | RunState::Failed)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ControlFlags {
    paused: bool,
    cancelled: bool,
}

/// Caller-side handle that pauses, resumes, or cancels a run.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: watch::Sender<ControlFlags>,
}

impl ControlHandle {
    /// Create a connected handle/token pair.
    pub fn new() -> (ControlHandle, ControlToken) {
        let (tx, rx) = watch::channel(ControlFlags::default());
        (ControlHandle { tx }, ControlToken { rx })
    }

    /// Request a pause. Takes effect at the controller's next suspension
    /// point; an in-flight provider call is not aborted.
    pub fn pause(&self) {
        self.tx.send_modify(|flags| flags.paused = true);
    }

    /// Resume a paused run.
    pub fn resume(&self) {
        self.tx.send_modify(|flags| flags.paused = false);
    }

    /// Cancel the run. Terminal; checked before each dispatch, and the
    /// result of a call already in flight is discarded.
    pub fn cancel(&self) {
        self.tx.send_modify(|flags| flags.cancelled = true);
    }

    /// Whether a pause is currently requested.
    pub fn is_paused(&self) -> bool {
        self.tx.borrow().paused
    }

    /// Whether the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.tx.borrow().cancelled
    }
}

/// Controller-side token observed at suspension points.
#[derive(Debug)]
pub struct ControlToken {
    rx: watch::Receiver<ControlFlags>,
}

impl ControlToken {
    /// A token that is never paused or cancelled, for unsupervised runs.
    pub fn unsupervised() -> Self {
        ControlHandle::new().1
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.rx.borrow().cancelled
    }

    /// Whether a pause is currently requested.
    pub fn is_paused(&self) -> bool {
        self.rx.borrow().paused
    }

    /// Block while paused; returns `false` when the run was cancelled either
    /// before or during the wait.
    ///
    /// The wait is driven by watch notifications from the handle, so resume
    /// wakes the controller immediately. A dropped handle counts as a
    /// resume: an unsupervised run must not hang forever.
    pub async fn wait_if_paused(&mut self) -> bool {
        loop {
            let flags = *self.rx.borrow_and_update();
            if flags.cancelled {
                return false;
            }
            if !flags.paused {
                return true;
            }
            if self.rx.changed().await.is_err() {
                return true;
            }
        }
    }
}
