//! [`GitBackup`] — snapshots the database file into a git working copy and
//! pushes it to a remote.
//!
//! The operation is scoped: every precondition is verified before the store
//! file is copied, so a misconfigured backup never leaves the working copy
//! half-touched.

use std::path::{Path, PathBuf};

use glasskeep_core::backup::{BackupError, BackupReport, BackupTarget};
use tokio::process::Command;

use crate::BackupConfig;

/// Backup target committing database snapshots to a git working copy.
pub struct GitBackup {
  database_path: PathBuf,
  working_copy:  PathBuf,
  remote:        String,
}

impl GitBackup {
  pub fn new(database_path: impl Into<PathBuf>, config: &BackupConfig) -> Self {
    Self {
      database_path: database_path.into(),
      working_copy:  config.working_copy.clone(),
      remote:        config.remote.clone(),
    }
  }

  /// File name of the snapshot inside the working copy — the database file's
  /// own name.
  fn snapshot_name(&self) -> Result<&std::ffi::OsStr, BackupError> {
    self.database_path.file_name().ok_or_else(|| {
      BackupError::Precondition(format!(
        "database path {} has no file name",
        self.database_path.display()
      ))
    })
  }

  async fn check_preconditions(&self) -> Result<(), BackupError> {
    if !tokio::fs::try_exists(&self.database_path).await.unwrap_or(false) {
      return Err(BackupError::Precondition(format!(
        "database file {} does not exist",
        self.database_path.display()
      )));
    }
    if !tokio::fs::try_exists(self.working_copy.join(".git"))
      .await
      .unwrap_or(false)
    {
      return Err(BackupError::Precondition(format!(
        "{} is not a git working copy",
        self.working_copy.display()
      )));
    }

    let status = run_git(&self.working_copy, &["status", "--porcelain"]).await?;
    if !status.trim().is_empty() {
      return Err(BackupError::Precondition(format!(
        "working copy {} has uncommitted changes",
        self.working_copy.display()
      )));
    }
    Ok(())
  }

  /// Unwind a snapshot that was staged but never committed, so the clean
  /// working copy precondition holds for the next attempt.
  async fn discard_staged_snapshot(&self, name: &str, snapshot_path: &Path) {
    let _ = run_git(&self.working_copy, &["reset", "-q", "--", name]).await;
    // A snapshot of an already-tracked database is restored from the index;
    // a first-time snapshot was never tracked and is simply deleted.
    if run_git(&self.working_copy, &["checkout", "-q", "--", name])
      .await
      .is_err()
    {
      let _ = tokio::fs::remove_file(snapshot_path).await;
    }
  }
}

impl BackupTarget for GitBackup {
  async fn snapshot(&self, message: &str) -> Result<BackupReport, BackupError> {
    self.check_preconditions().await?;

    let name = self.snapshot_name()?;
    let snapshot_path = self.working_copy.join(name);
    tokio::fs::copy(&self.database_path, &snapshot_path)
      .await
      .map_err(|e| BackupError::Other(format!("copying snapshot: {e}")))?;

    let name_str = name.to_string_lossy();
    run_git(&self.working_copy, &["add", "--", &name_str]).await?;

    // An unchanged database means an empty commit; report it rather than
    // failing, and skip the push.
    let diff = run_git(
      &self.working_copy,
      &["status", "--porcelain", "--", &name_str],
    )
    .await?;
    if diff.trim().is_empty() {
      tracing::info!("database unchanged since last snapshot; nothing to commit");
      return Ok(BackupReport { snapshot_path, committed: false, pushed: false });
    }

    if let Err(err) =
      run_git(&self.working_copy, &["commit", "-m", message]).await
    {
      self.discard_staged_snapshot(&name_str, &snapshot_path).await;
      return Err(err);
    }

    match run_git(&self.working_copy, &["push", &self.remote]).await {
      Ok(_) => Ok(BackupReport { snapshot_path, committed: true, pushed: true }),
      Err(BackupError::Other(detail)) => Err(BackupError::Transport(detail)),
      Err(other) => Err(other),
    }
  }
}

/// Run a git subcommand in `dir`, returning stdout on success.
async fn run_git(dir: &Path, args: &[&str]) -> Result<String, BackupError> {
  let output = Command::new("git")
    .arg("-C")
    .arg(dir)
    .args(args)
    .output()
    .await
    .map_err(|e| BackupError::Other(format!("spawning git: {e}")))?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    return Err(BackupError::Other(format!(
      "git {} failed: {}",
      args.first().copied().unwrap_or(""),
      stderr.trim()
    )));
  }
  Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(working_copy: PathBuf) -> BackupConfig {
    BackupConfig { working_copy, remote: "origin".to_owned() }
  }

  #[tokio::test]
  async fn missing_database_file_fails_precondition() {
    let dir = tempfile::tempdir().unwrap();
    let backup =
      GitBackup::new(dir.path().join("absent.db"), &config(dir.path().into()));

    let err = backup.snapshot("nightly").await.unwrap_err();
    assert!(matches!(err, BackupError::Precondition(_)));
  }

  #[tokio::test]
  async fn missing_working_copy_fails_precondition() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("subscriptions.db");
    tokio::fs::write(&db, b"not really a database").await.unwrap();

    // The directory exists but is not a git working copy.
    let backup = GitBackup::new(&db, &config(dir.path().join("workdir")));

    let err = backup.snapshot("nightly").await.unwrap_err();
    assert!(matches!(err, BackupError::Precondition(_)));
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn failed_commit_leaves_the_working_copy_clean() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("subscriptions.db");
    tokio::fs::write(&db, b"snapshot contents").await.unwrap();

    let workdir = dir.path().join("workdir");
    tokio::fs::create_dir(&workdir).await.unwrap();
    run_git(&workdir, &["init", "-q"]).await.unwrap();
    run_git(&workdir, &["config", "user.name", "test"]).await.unwrap();
    run_git(&workdir, &["config", "user.email", "test@localhost"])
      .await
      .unwrap();
    run_git(&workdir, &["commit", "--allow-empty", "-q", "-m", "init"])
      .await
      .unwrap();

    // A rejecting pre-commit hook makes every commit attempt fail.
    let hook = workdir.join(".git/hooks/pre-commit");
    tokio::fs::create_dir_all(hook.parent().unwrap()).await.unwrap();
    tokio::fs::write(&hook, "#!/bin/sh\nexit 1\n").await.unwrap();
    tokio::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755))
      .await
      .unwrap();

    let backup = GitBackup::new(&db, &config(workdir.clone()));
    let err = backup.snapshot("nightly").await.unwrap_err();
    assert!(matches!(err, BackupError::Other(_)));

    // The staged snapshot was unwound, so the copy is clean again and the
    // next attempt gets past the precondition check.
    let status = run_git(&workdir, &["status", "--porcelain"]).await.unwrap();
    assert!(status.trim().is_empty());

    let err = backup.snapshot("nightly").await.unwrap_err();
    assert!(matches!(err, BackupError::Other(_)));
  }

  #[tokio::test]
  async fn preconditions_leave_the_working_copy_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let workdir = dir.path().join("workdir");
    tokio::fs::create_dir(&workdir).await.unwrap();

    let backup =
      GitBackup::new(dir.path().join("absent.db"), &config(workdir.clone()));
    backup.snapshot("nightly").await.unwrap_err();

    // No snapshot file was copied in.
    let mut entries = tokio::fs::read_dir(&workdir).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
  }
}
