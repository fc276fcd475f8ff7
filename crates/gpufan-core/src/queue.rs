//! Shared task queue and report sink
//!
//! The only mutable state shared between workers. Both types are internally
//! synchronized; every operation is atomic from the caller's point of view.

use crate::task::{Task, TaskReport};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// FIFO queue of pending tasks, safe for concurrent removal.
///
/// `try_dequeue` never waits: an empty queue answers `None` immediately so a
/// worker can detect exhaustion and terminate instead of idling.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    inner: Arc<Mutex<VecDeque<Task>>>,
}

impl TaskQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task to the back of the queue
    pub async fn enqueue(&self, task: Task) {
        self.inner.lock().await.push_back(task);
    }

    /// Remove and return the front task, or `None` if the queue is empty.
    /// Concurrent calls serialize: a task is delivered exactly once.
    pub async fn try_dequeue(&self) -> Option<Task> {
        self.inner.lock().await.pop_front()
    }

    /// Number of pending tasks
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether the queue is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

/// Concurrent-safe accumulator for task reports, one per completed task.
#[derive(Debug, Clone, Default)]
pub struct ReportSink {
    inner: Arc<Mutex<Vec<TaskReport>>>,
}

impl ReportSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a report
    pub async fn push(&self, report: TaskReport) {
        self.inner.lock().await.push(report);
    }

    /// Number of collected reports
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Drain all collected reports. Call after the pool barrier has
    /// returned; later pushes are not reflected in the returned vector.
    pub async fn drain(&self) -> Vec<TaskReport> {
        std::mem::take(&mut *self.inner.lock().await)
    }
}
