//! Glasskeep server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite subscription store, and serves the admin JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use glasskeep_api::ApiState;
use glasskeep_server::{ServerConfig, backup::GitBackup, mailer::HttpMailer};
use glasskeep_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Glasskeep subscription admin server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("GLASSKEEP"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in the store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open the SQLite store; the schema is created idempotently.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Wire the optional collaborators.
  let notifier: Option<Arc<HttpMailer>> = server_cfg
    .notify
    .clone()
    .map(HttpMailer::new)
    .transpose()
    .map_err(|e| anyhow::anyhow!("{e}"))?
    .map(Arc::new);
  if notifier.is_none() {
    tracing::info!("no [notify] section; change notifications disabled");
  }

  let backup: Option<Arc<GitBackup>> = server_cfg
    .backup
    .as_ref()
    .map(|cfg| Arc::new(GitBackup::new(&store_path, cfg)));
  if backup.is_none() {
    tracing::info!("no [backup] section; backup endpoint disabled");
  }

  let state = ApiState { store: Arc::new(store), notifier, backup };

  let app = Router::new()
    .nest("/api", glasskeep_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
