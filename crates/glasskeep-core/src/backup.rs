//! Backup boundary — snapshotting the database into a version-controlled
//! working copy.

use std::{future::Future, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a backup did not complete.
#[derive(Debug, Error)]
pub enum BackupError {
  /// A precondition failed before anything was touched: missing database
  /// file, missing working copy, or uncommitted changes already present.
  #[error("backup precondition failed: {0}")]
  Precondition(String),

  /// The snapshot was committed locally but could not be pushed.
  #[error("backup push failed: {0}")]
  Transport(String),

  #[error("backup failed: {0}")]
  Other(String),
}

/// What a completed snapshot did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupReport {
  /// Where the database copy landed inside the working copy.
  pub snapshot_path: PathBuf,
  /// `false` when the database was byte-identical to the previous snapshot,
  /// in which case nothing was committed or pushed.
  pub committed: bool,
  pub pushed:    bool,
}

/// External collaborator that snapshots the database file, commits, and
/// pushes to a remote. Preconditions must be verified before the store file
/// is touched.
pub trait BackupTarget: Send + Sync {
  fn snapshot<'a>(
    &'a self,
    message: &'a str,
  ) -> impl Future<Output = Result<BackupReport, BackupError>> + Send + 'a;
}
