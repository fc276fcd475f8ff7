//! Git worktree isolation
//!
//! A batch can run inside a disposable, branch-backed copy of the current
//! checkout so long-running tasks are not affected by edits made while they
//! run. The lifecycle is create-before-dispatch, clean-after-barrier; a
//! successfully created context is cleaned exactly once on every exit path.

use crate::error::{Error, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// A created, not-yet-cleaned isolation worktree.
#[derive(Debug, Clone)]
pub struct WorktreeContext {
    /// Directory the worktree was created under
    pub base_dir: PathBuf,

    /// Unique name of this run
    pub name: String,

    /// Branch backing the worktree
    pub branch: String,

    /// Absolute path of the worktree, used as the workers' working directory
    pub path: PathBuf,
}

/// Manages the isolation worktree of one repository.
///
/// Assumes exclusive access to the repository's worktree registry; two
/// concurrent gpufan invocations against the same checkout are not supported.
pub struct WorktreeManager {
    /// Repository root directory
    root: PathBuf,
}

impl WorktreeManager {
    /// Create a manager for the repository rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Run a git command in the repository root
    fn run_git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::GitCommand(format!(
                "git {}: {}",
                args.join(" "),
                stderr.trim()
            )))
        }
    }

    /// Whether the repository has uncommitted changes to tracked files.
    /// Untracked files do not count.
    pub fn is_dirty(&self) -> Result<bool> {
        let status = self.run_git(&["status", "-uno", "--porcelain"])?;
        Ok(!status.is_empty())
    }

    /// Create a branch-backed worktree under `base_dir`.
    ///
    /// Fails with [`Error::DirtyRepository`] before touching the filesystem
    /// when the repository is dirty and `allow_dirty` is not set; the
    /// worktree then holds the last commit regardless of working-tree state.
    pub fn create(&self, base_dir: &Path, allow_dirty: bool) -> Result<WorktreeContext> {
        if self.is_dirty().map_err(creation_error)? && !allow_dirty {
            return Err(Error::DirtyRepository);
        }

        // Timestamp keeps the directory listing readable, the uuid suffix
        // makes rapid repeated invocations collision-proof.
        let name = format!(
            "{}-{}",
            Local::now().format("%Y-%m-%d_%H-%M-%S-%6f"),
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        );
        let branch = format!("experiment/{name}");

        std::fs::create_dir_all(base_dir).map_err(|e| creation_error(Error::Io(e)))?;
        let path = if base_dir.is_absolute() {
            base_dir.join(&name)
        } else {
            std::env::current_dir()
                .map_err(|e| creation_error(Error::Io(e)))?
                .join(base_dir)
                .join(&name)
        };

        let path_arg = path.to_string_lossy().to_string();
        self.run_git(&["worktree", "add", &path_arg, "-b", &branch])
            .map_err(creation_error)?;

        info!(path = %path.display(), branch = %branch, "created isolation worktree");
        Ok(WorktreeContext {
            base_dir: base_dir.to_path_buf(),
            name,
            branch,
            path,
        })
    }

    /// Remove the worktree directory, prune the stale registration, and
    /// delete the branch. Invoked exactly once per created context.
    pub fn clean(&self, context: &WorktreeContext) -> Result<()> {
        debug!(path = %context.path.display(), "cleaning isolation worktree");

        if let Err(e) = std::fs::remove_dir_all(&context.path) {
            // A worktree that vanished already is fine; anything else is not.
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(Error::IsolationCleanup(format!(
                    "removing {}: {}",
                    context.path.display(),
                    e
                )));
            }
            warn!(path = %context.path.display(), "worktree directory already gone");
        }

        self.run_git(&["worktree", "prune"]).map_err(cleanup_error)?;
        // -D, not -d: the branch may hold commits made inside the worktree
        self.run_git(&["branch", "-D", &context.branch])
            .map_err(cleanup_error)?;

        info!(branch = %context.branch, "isolation worktree cleaned");
        Ok(())
    }
}

fn creation_error(e: Error) -> Error {
    Error::IsolationCreation(e.to_string())
}

fn cleanup_error(e: Error) -> Error {
    Error::IsolationCleanup(e.to_string())
}
