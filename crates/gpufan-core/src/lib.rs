//! # gpufan-core
//!
//! Task distribution engine for gpufan:
//! - Task: command template + parameter, placeholder substitution, shlex tokenization
//! - Queue/Sink: the only shared mutable state, internally synchronized
//! - Worker: one consumer per GPU slot, drains the queue sequentially
//! - Pool: spawns the workers, joins them through a single barrier
//! - Worktree: disposable git-worktree isolation with guaranteed cleanup
//! - Batch: orchestrates the above into one run
//!
//! ```text
//!            TaskQueue (FIFO, try_dequeue -> Task | empty)
//!                │
//!    ┌───────────┼───────────┐
//!    ▼           ▼           ▼
//!  Worker      Worker      Worker        one per --gpus entry
//!  (slot 0)    (slot 1)    (slot 1)      duplicates are meaningful
//!    │           │           │
//!    └───────────┼───────────┘
//!                ▼
//!            ReportSink ──▶ BatchReport
//! ```

pub mod batch;
pub mod error;
pub mod pool;
pub mod queue;
pub mod task;
pub mod timefmt;
pub mod worker;
pub mod worktree;

pub use batch::{run_batch, BatchConfig, BatchReport, IsolationConfig};
pub use error::{Error, Result};
pub use pool::WorkerPool;
pub use queue::{ReportSink, TaskQueue};
pub use task::{Task, TaskReport};
pub use timefmt::format_elapsed_ms;
pub use worker::Worker;
pub use worktree::{WorktreeContext, WorktreeManager};
