//! End-to-end batch runs against scratch git repositories

use gpufan_core::error::Error;
use gpufan_core::{run_batch, BatchConfig, IsolationConfig, WorktreeManager};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {:?} failed", args);
}

fn scratch_repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init"]);
    git(dir.path(), &["config", "user.email", "test@example.com"]);
    git(dir.path(), &["config", "user.name", "test"]);
    std::fs::write(dir.path().join("tracked.txt"), "v1\n").unwrap();
    git(dir.path(), &["add", "tracked.txt"]);
    git(dir.path(), &["commit", "-m", "initial"]);
    dir
}

fn config(repo: &TempDir, command: &str, parameters: &[&str]) -> BatchConfig {
    BatchConfig {
        gpus: vec![0, 1],
        command: command.to_string(),
        parameters: parameters.iter().map(|p| p.to_string()).collect(),
        isolation: Some(IsolationConfig {
            repo_root: repo.path().to_path_buf(),
            base_dir: repo.path().join("tmp-worktrees"),
            allow_dirty: false,
        }),
    }
}

#[tokio::test]
async fn isolated_batch_runs_inside_the_worktree_and_cleans_up() {
    let repo = scratch_repo();
    // cat only succeeds if the worktree copy is the working directory
    let report = run_batch(&config(&repo, "cat tracked.txt", &["a", "b", "c"]))
        .await
        .unwrap();

    assert_eq!(report.reports.len(), 3);
    assert!(report.all_succeeded());

    // Worktree directory and branch are gone afterwards
    let base = repo.path().join("tmp-worktrees");
    let leftovers: Vec<_> = match std::fs::read_dir(&base) {
        Ok(entries) => entries.collect(),
        Err(_) => Vec::new(),
    };
    assert!(leftovers.is_empty());

    let manager = WorktreeManager::new(repo.path());
    assert!(!manager.is_dirty().unwrap());
    let branches = Command::new("git")
        .args(["branch", "--list", "experiment/*"])
        .current_dir(repo.path())
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&branches.stdout).trim().is_empty());
}

#[tokio::test]
async fn cleanup_also_runs_when_tasks_fail() {
    let repo = scratch_repo();
    let report = run_batch(&config(&repo, "false", &["x"])).await.unwrap();
    assert_eq!(report.failed_count(), 1);

    let branches = Command::new("git")
        .args(["branch", "--list", "experiment/*"])
        .current_dir(repo.path())
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&branches.stdout).trim().is_empty());
}

#[tokio::test]
async fn dirty_repo_aborts_before_any_task_launches() {
    let repo = scratch_repo();
    std::fs::write(repo.path().join("tracked.txt"), "v2 uncommitted\n").unwrap();

    // The command would drop a marker file if it ever ran
    let marker = repo.path().join("ran-{x}");
    let mut cfg = config(
        &repo,
        &format!("touch {}", marker.to_string_lossy()),
        &["a"],
    );

    let err = run_batch(&cfg).await.unwrap_err();
    assert!(matches!(err, Error::DirtyRepository));
    assert!(!repo.path().join("ran-a").exists());
    assert!(!repo.path().join("tmp-worktrees").exists());

    // The override flag lets the same batch through
    if let Some(iso) = cfg.isolation.as_mut() {
        iso.allow_dirty = true;
    }
    let report = run_batch(&cfg).await.unwrap();
    assert!(report.all_succeeded());
}
