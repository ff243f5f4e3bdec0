//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use glasskeep_core::{backup::BackupError, error::ChangeError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Every variant carries a stable
/// machine-readable `code` alongside the human-readable message.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("subscription expired: {0}")]
  SubscriptionExpired(String),

  #[error("quota exhausted: {0}")]
  QuotaExhausted(String),

  #[error("backup precondition failed: {0}")]
  BackupPrecondition(String),

  #[error("backup push failed: {0}")]
  BackupTransport(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  fn code(&self) -> &'static str {
    match self {
      ApiError::NotFound(_) => "not_found",
      ApiError::BadRequest(_) => "bad_request",
      ApiError::SubscriptionExpired(_) => "subscription_expired",
      ApiError::QuotaExhausted(_) => "quota_exhausted",
      ApiError::BackupPrecondition(_) => "backup_precondition",
      ApiError::BackupTransport(_) => "backup_transport",
      ApiError::Store(_) => "store_error",
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::SubscriptionExpired(_) | ApiError::QuotaExhausted(_) => {
        StatusCode::CONFLICT
      }
      ApiError::BackupPrecondition(_) => StatusCode::PRECONDITION_FAILED,
      ApiError::BackupTransport(_) => StatusCode::BAD_GATEWAY,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = match &self {
      ApiError::Store(e) => e.to_string(),
      other => other.to_string(),
    };
    (self.status(), Json(json!({ "error": message, "code": self.code() })))
      .into_response()
  }
}

impl<E> From<ChangeError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(err: ChangeError<E>) -> Self {
    match err {
      ChangeError::CustomerNotFound(id) => {
        ApiError::NotFound(format!("customer {id} not found"))
      }
      e @ ChangeError::SubscriptionExpired { .. } => {
        ApiError::SubscriptionExpired(e.to_string())
      }
      e @ ChangeError::QuotaExhausted(_) => {
        ApiError::QuotaExhausted(e.to_string())
      }
      ChangeError::Store(e) => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<BackupError> for ApiError {
  fn from(err: BackupError) -> Self {
    match err {
      BackupError::Precondition(m) => ApiError::BackupPrecondition(m),
      BackupError::Transport(m) => ApiError::BackupTransport(m),
      e @ BackupError::Other(_) => ApiError::Store(Box::new(e)),
    }
  }
}
