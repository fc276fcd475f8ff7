//! Worker - one consumer bound to a GPU slot
//!
//! A worker repeatedly pulls a task from the shared queue, substitutes its
//! slot and the task parameter into the command template, launches the
//! resulting process, and records a report. It terminates normally when the
//! queue answers empty. Task failure is local: a failed command is recorded
//! and the worker moves on to the next task.

use crate::queue::{ReportSink, TaskQueue};
use crate::task::{tokenize, Task, TaskReport};
use crate::timefmt::format_elapsed_ms;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, error, info};

/// A long-lived consumer bound to one GPU slot.
pub struct Worker {
    /// GPU slot identifier, substituted for `{gpu}`
    gpu: u32,

    /// Shared task queue
    queue: TaskQueue,

    /// Shared report sink
    sink: ReportSink,

    /// Working directory for launched processes; the isolation worktree
    /// when isolation is active, otherwise inherited from the caller
    working_dir: Option<PathBuf>,
}

impl Worker {
    /// Create a worker bound to the given GPU slot
    pub fn new(
        gpu: u32,
        queue: TaskQueue,
        sink: ReportSink,
        working_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            gpu,
            queue,
            sink,
            working_dir,
        }
    }

    /// Drain the queue until it answers empty. Runs tasks strictly
    /// sequentially; concurrency exists only across workers.
    pub async fn run(self) {
        while let Some(task) = self.queue.try_dequeue().await {
            let report = self.execute(&task).await;
            self.sink.push(report).await;
        }
        debug!(gpu = self.gpu, "queue empty, worker exiting");
    }

    /// Run one task to completion and produce its report.
    async fn execute(&self, task: &Task) -> TaskReport {
        let rendered = task.render(self.gpu);

        let argv = match tokenize(&rendered) {
            Ok(argv) => argv,
            Err(e) => {
                // Cannot launch at all; report as a local failure so the
                // batch still ends up with one report per task.
                error!(gpu = self.gpu, parameter = %task.parameter, "{}", e);
                return TaskReport {
                    success: false,
                    parameter: task.parameter.clone(),
                    gpu: self.gpu,
                    elapsed_ms: 0,
                };
            }
        };

        info!(gpu = self.gpu, "running {}", task.parameter);
        debug!(gpu = self.gpu, command = %rendered, "launching");

        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let start = Instant::now();
        let output = cmd.output().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let success = match output {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                // Surface captured stderr for operator visibility
                let stderr = String::from_utf8_lossy(&output.stderr);
                error!(
                    gpu = self.gpu,
                    parameter = %task.parameter,
                    "task exited with {}\n{}",
                    output.status,
                    stderr.trim_end(),
                );
                false
            }
            Err(e) => {
                error!(
                    gpu = self.gpu,
                    parameter = %task.parameter,
                    "failed to launch `{}`: {}",
                    argv[0],
                    e,
                );
                false
            }
        };

        info!(
            gpu = self.gpu,
            "finished {} after {}",
            task.parameter,
            format_elapsed_ms(elapsed_ms),
        );

        TaskReport {
            success,
            parameter: task.parameter.clone(),
            gpu: self.gpu,
            elapsed_ms,
        }
    }
}
