//! Batch orchestration
//!
//! Composes the queue, the worker pool, and the optional worktree isolation:
//! create the worktree before the first task is dispatched, run the pool to
//! its barrier, drain the reports, and clean the worktree exactly once on
//! every exit path past a successful create.

use crate::error::Result;
use crate::pool::WorkerPool;
use crate::queue::{ReportSink, TaskQueue};
use crate::task::{Task, TaskReport};
use crate::worktree::{WorktreeContext, WorktreeManager};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Isolation settings for a batch.
#[derive(Debug, Clone)]
pub struct IsolationConfig {
    /// Repository to take the worktree from
    pub repo_root: PathBuf,

    /// Base directory the disposable worktree is created under
    pub base_dir: PathBuf,

    /// Run from the last commit even if the repository is dirty
    pub allow_dirty: bool,
}

/// Everything one batch run needs.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// GPU slot identifiers; one worker per entry
    pub gpus: Vec<u32>,

    /// Command template with `{gpu}` and `{x}` placeholders
    pub command: String,

    /// One task is enqueued per parameter
    pub parameters: Vec<String>,

    /// When set, the whole batch runs inside a disposable worktree
    pub isolation: Option<IsolationConfig>,
}

/// Collected outcome of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// The command template that was fanned out
    pub command: String,

    /// Wall-clock time of the whole batch in milliseconds
    pub total_elapsed_ms: u64,

    /// One report per input parameter
    pub reports: Vec<TaskReport>,
}

impl BatchReport {
    /// Number of failed tasks
    pub fn failed_count(&self) -> usize {
        self.reports.iter().filter(|r| !r.success).count()
    }

    /// Whether every task exited zero
    pub fn all_succeeded(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Run a batch to completion.
///
/// Fatal errors (dirty repository, worktree creation failure) abort before
/// any task runs. Task failures are recorded in the report and never abort
/// the batch. A cleanup failure propagates when the run itself succeeded;
/// after a run error it is logged and the run error wins.
pub async fn run_batch(config: &BatchConfig) -> Result<BatchReport> {
    let isolation = match &config.isolation {
        Some(iso) => {
            let manager = WorktreeManager::new(&iso.repo_root);
            let context = manager.create(&iso.base_dir, iso.allow_dirty)?;
            Some((manager, context))
        }
        None => None,
    };

    let working_dir = isolation.as_ref().map(|(_, ctx)| ctx.path.clone());
    let result = execute(config, working_dir).await;

    match isolation {
        Some((manager, context)) => finish(&manager, &context, result),
        None => result,
    }
}

/// Queue-and-pool phase, isolated so the caller can pair any outcome with
/// the guaranteed cleanup.
async fn execute(config: &BatchConfig, working_dir: Option<PathBuf>) -> Result<BatchReport> {
    let start = Instant::now();

    let queue = TaskQueue::new();
    for parameter in &config.parameters {
        queue.enqueue(Task::new(&config.command, parameter)).await;
    }
    let sink = ReportSink::new();

    info!(
        tasks = config.parameters.len(),
        workers = config.gpus.len(),
        "starting batch"
    );

    let pool = WorkerPool::spawn(&config.gpus, queue, sink.clone(), working_dir);
    pool.await_completion().await?;

    Ok(BatchReport {
        command: config.command.clone(),
        total_elapsed_ms: start.elapsed().as_millis() as u64,
        reports: sink.drain().await,
    })
}

/// Clean the worktree exactly once and merge the outcome with the run result.
fn finish(
    manager: &WorktreeManager,
    context: &WorktreeContext,
    result: Result<BatchReport>,
) -> Result<BatchReport> {
    match (manager.clean(context), result) {
        (Ok(()), result) => result,
        (Err(clean_err), Ok(_)) => Err(clean_err),
        (Err(clean_err), Err(run_err)) => {
            warn!("worktree cleanup failed after batch error: {clean_err}");
            Err(run_err)
        }
    }
}
