//! Handler for `POST /backup` — snapshot the database into the configured
//! version-controlled working copy.

use axum::{Json, extract::State};
use chrono::Local;
use glasskeep_core::backup::{BackupReport, BackupTarget};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct BackupBody {
  /// Commit message; defaults to a dated message.
  pub message: Option<String>,
}

/// `POST /backup`
pub async fn backup<S, N, B>(
  State(state): State<ApiState<S, N, B>>,
  body: Option<Json<BackupBody>>,
) -> Result<Json<BackupReport>, ApiError>
where
  B: BackupTarget,
{
  let Some(target) = &state.backup else {
    return Err(ApiError::BadRequest(
      "no backup target configured".to_owned(),
    ));
  };

  let body = body.map(|Json(b)| b).unwrap_or_default();
  let message = body.message.unwrap_or_else(|| {
    format!("database backup {}", Local::now().date_naive())
  });

  let report = target.snapshot(&message).await?;
  tracing::info!(
    committed = report.committed,
    pushed = report.pushed,
    "backup completed"
  );
  Ok(Json(report))
}
