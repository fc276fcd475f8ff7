//! Worker pool - one worker per configured GPU slot
//!
//! All workers start together and are joined through a single barrier.
//! Duplicate slot identifiers are meaningful: two slots with equal value run
//! two independent consumers.

use crate::error::{Error, Result};
use crate::queue::{ReportSink, TaskQueue};
use crate::worker::Worker;
use futures::future::join_all;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::debug;

/// A fixed pool of concurrently running workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn one worker per GPU slot over the shared queue and sink.
    /// Workers begin consuming immediately.
    pub fn spawn(
        gpus: &[u32],
        queue: TaskQueue,
        sink: ReportSink,
        working_dir: Option<PathBuf>,
    ) -> Self {
        let handles = gpus
            .iter()
            .map(|&gpu| {
                let worker = Worker::new(gpu, queue.clone(), sink.clone(), working_dir.clone());
                tokio::spawn(worker.run())
            })
            .collect();
        debug!(workers = gpus.len(), "worker pool started");
        Self { handles }
    }

    /// Block until every worker has terminated. A panicked worker surfaces
    /// as an error, but only after all siblings have been joined, so the
    /// barrier property holds on every path.
    pub async fn await_completion(self) -> Result<()> {
        let results = join_all(self.handles).await;
        for result in results {
            result.map_err(|e| Error::WorkerPanic(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use std::collections::BTreeSet;

    async fn populate(parameters: &[&str], template: &str) -> (TaskQueue, ReportSink) {
        let queue = TaskQueue::new();
        for p in parameters {
            queue.enqueue(Task::new(template, *p)).await;
        }
        (queue, ReportSink::new())
    }

    #[tokio::test]
    async fn test_pool_produces_one_report_per_task() {
        let (queue, sink) = populate(&["a", "b", "c"], "echo {gpu} {x}").await;

        let pool = WorkerPool::spawn(&[0, 1], queue, sink.clone(), None);
        pool.await_completion().await.unwrap();

        let reports = sink.drain().await;
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.success));

        let parameters: BTreeSet<_> = reports.iter().map(|r| r.parameter.as_str()).collect();
        assert_eq!(parameters, BTreeSet::from(["a", "b", "c"]));
    }

    #[tokio::test]
    async fn test_more_workers_than_tasks_is_not_an_error() {
        let (queue, sink) = populate(&["only"], "echo {x}").await;

        let pool = WorkerPool::spawn(&[0, 1, 2, 3], queue, sink.clone(), None);
        pool.await_completion().await.unwrap();

        assert_eq!(sink.drain().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slots_run_independent_workers() {
        let (queue, sink) = populate(&["a", "b", "c", "d"], "echo {x}").await;

        let pool = WorkerPool::spawn(&[7, 7], queue, sink.clone(), None);
        pool.await_completion().await.unwrap();

        let reports = sink.drain().await;
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| r.gpu == 7));
    }

    #[tokio::test]
    async fn test_failing_sibling_does_not_affect_others() {
        let queue = TaskQueue::new();
        queue.enqueue(Task::new("false", "fails")).await;
        for p in ["a", "b", "c"] {
            queue.enqueue(Task::new("echo {x}", p)).await;
        }
        let sink = ReportSink::new();

        let pool = WorkerPool::spawn(&[0, 1], queue, sink.clone(), None);
        pool.await_completion().await.unwrap();

        let reports = sink.drain().await;
        assert_eq!(reports.len(), 4);
        assert_eq!(reports.iter().filter(|r| !r.success).count(), 1);
    }
}
