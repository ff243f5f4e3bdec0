//! Error type for `glasskeep-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] glasskeep_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("stored plan label is not recognised: {0:?}")]
  CorruptPlan(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
