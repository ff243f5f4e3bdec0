//! Server-side wiring for Glasskeep: configuration and the production
//! collaborator implementations (mail notification, git backup).

pub mod backup;
pub mod mailer;

use std::path::PathBuf;

use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Top-level server configuration, read from `config.toml` (overridable with
/// `GLASSKEEP_*` environment variables).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,

  /// Path to the SQLite database file. `~` is expanded.
  pub store_path: PathBuf,

  /// Mail delivery settings; omit to skip change notifications.
  pub notify: Option<NotifyConfig>,

  /// Backup working-copy settings; omit to disable the backup endpoint.
  pub backup: Option<BackupConfig>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5310 }

/// Settings for the JSON mail API used to notify customers.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
  /// Endpoint accepting the transactional-mail POST.
  pub api_url: String,
  pub api_key: String,
  pub sender_name: String,
  pub sender_address: String,
}

/// Settings for the git-backed database backup.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupConfig {
  /// Checked-out git working copy the database snapshot is committed into.
  pub working_copy: PathBuf,
  #[serde(default = "default_remote")]
  pub remote: String,
}

fn default_remote() -> String { "origin".to_owned() }
