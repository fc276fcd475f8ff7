//! Error types for gpufan
//!
//! All library errors are centralized here. Fatal errors (dirty repository,
//! worktree creation failure) abort a batch before any task is dispatched;
//! per-task failures never surface as `Error` - they are recorded as failed
//! reports and the batch continues.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// gpufan error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Worktree isolation
    // ========================================================================
    #[error("repository has uncommitted changes (commit them or pass --last-clean-git)")]
    DirtyRepository,

    #[error("failed to create isolated worktree: {0}")]
    IsolationCreation(String),

    #[error("failed to clean up isolated worktree: {0}")]
    IsolationCleanup(String),

    #[error("git command failed: {0}")]
    GitCommand(String),

    // ========================================================================
    // Batch execution
    // ========================================================================
    #[error("invalid command after substitution: {0}")]
    InvalidCommand(String),

    #[error("worker panicked: {0}")]
    WorkerPanic(String),

    // ========================================================================
    // External error conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
