//! Pipeline stages: long-running tasks moving data between the queues.

pub(crate) mod hunt;
pub(crate) mod image;

use tokio::task::JoinHandle;

/// Handle onto one running pipeline stage.
///
/// Wraps the stage task so the orchestrator can observe completion and
/// request cancellation without owning the task's internals. Once
/// [`is_done`](Self::is_done) reports `true` it never reverts.
pub(crate) struct StageHandle {
    task: JoinHandle<()>,
}

impl StageHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Whether the stage has terminated (cleanly or by cancellation).
    pub(crate) fn is_done(&self) -> bool {
        self.task.is_finished()
    }

    /// Request cancellation. The stage stops at its next suspension point;
    /// nothing is drained. Idempotent.
    pub(crate) fn cancel(&self) {
        self.task.abort();
    }
}
