//! Handlers for `/customers/:id/changes` — the change verification and
//! logging path.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/customers/:id/changes` | Verify quota/validity and log a change |
//! | `GET`  | `/customers/:id/changes` | Change history, oldest first |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use chrono::Local;
use glasskeep_core::{
  change::{ChangeReceipt, GlassChange},
  customer::Customer,
  notify::Notifier,
  store::SubscriptionStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Log a change ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LogChangeBody {
  /// Accepted but inert: per-family-member quota tracking is not
  /// implemented, and no semantics are invented for it here.
  pub family_member_id: Option<i64>,
}

/// How the post-commit notification went. `failed` is a partial success:
/// the change itself is already durably logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationStatus {
  Sent,
  /// No notifier configured for this deployment.
  Skipped,
  Failed { error: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogChangeResponse {
  pub change:            GlassChange,
  pub remaining_changes: u32,
  pub notification:      NotificationStatus,
}

/// `POST /customers/:id/changes`
pub async fn log<S, N, B>(
  State(state): State<ApiState<S, N, B>>,
  Path(customer_id): Path<i64>,
  body: Option<Json<LogChangeBody>>,
) -> Result<(StatusCode, Json<LogChangeResponse>), ApiError>
where
  S: SubscriptionStore,
  N: Notifier,
{
  let body = body.map(|Json(b)| b).unwrap_or_default();
  if body.family_member_id.is_some() {
    tracing::debug!(customer_id, "family_member_id supplied; ignored");
  }

  let today = Local::now().date_naive();
  let receipt = state.store.log_change(customer_id, today).await?;

  // The change is committed at this point; everything from here on is the
  // notification path, and its failures — including the contact lookup —
  // surface only in the `notification` outcome, never as an error response.
  let notification = match &state.notifier {
    None => NotificationStatus::Skipped,
    Some(notifier) => match state.store.get_customer(customer_id).await {
      Ok(Some(customer)) => {
        notify(notifier.as_ref(), &customer, &receipt).await
      }
      Ok(None) => NotificationStatus::Skipped,
      Err(e) => {
        tracing::warn!(
          customer_id,
          error = %e,
          "contact lookup failed; notification not sent"
        );
        NotificationStatus::Failed { error: e.to_string() }
      }
    },
  };

  tracing::info!(
    customer_id,
    remaining = receipt.remaining_changes,
    "glass change logged"
  );

  Ok((
    StatusCode::CREATED,
    Json(LogChangeResponse {
      change: receipt.change,
      remaining_changes: receipt.remaining_changes,
      notification,
    }),
  ))
}

async fn notify<N: Notifier>(
  notifier: &N,
  customer: &Customer,
  receipt: &ChangeReceipt,
) -> NotificationStatus {
  let subject = "Glass change logged";
  let body = format!(
    "Hello {},\n\nYour glass change on {} has been recorded. You have {} \
     change(s) remaining; your subscription is valid until {}.\n",
    customer.name,
    receipt.change.change_date,
    receipt.remaining_changes,
    customer.expiry_date(),
  );

  match notifier.notify(&customer.contact, subject, &body).await {
    Ok(()) => NotificationStatus::Sent,
    Err(e) => {
      tracing::warn!(customer_id = customer.id, error = %e, "notification failed");
      NotificationStatus::Failed { error: e.to_string() }
    }
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// `GET /customers/:id/changes`
pub async fn history<S, N, B>(
  State(state): State<ApiState<S, N, B>>,
  Path(customer_id): Path<i64>,
) -> Result<Json<Vec<GlassChange>>, ApiError>
where
  S: SubscriptionStore,
{
  // Distinguish "no changes yet" from "no such customer".
  state
    .store
    .get_customer(customer_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("customer {customer_id} not found"))
    })?;

  let changes = state
    .store
    .changes_for(customer_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(changes))
}
