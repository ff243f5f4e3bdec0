//! Handlers for `/customers` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/customers` | Register; body: [`RegisterBody`] |
//! | `GET`  | `/customers` | Full tabular projection |
//! | `GET`  | `/customers/names` | `(id, name)` pairs for selection controls |
//! | `GET`  | `/customers/:id` | One record; 404 if absent |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Local;
use glasskeep_core::{
  customer::{Customer, CustomerRow, CustomerSummary, NewCustomer},
  plan::Plan,
  store::SubscriptionStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── Register ────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /customers`. Field values mirror the
/// registration form: the plan is the literal label, family members a single
/// comma-separated string, and the photo base64-encoded.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:    String,
  pub contact: String,
  /// Base64-encoded photo-ID image.
  pub photo: Option<String>,
  #[serde(default)]
  pub family_members: String,
  /// One of the recognised plan labels; anything else is rejected.
  pub plan: String,
}

/// `POST /customers` — returns 201 + the stored [`Customer`].
pub async fn register<S, N, B>(
  State(state): State<ApiState<S, N, B>>,
  Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<Customer>), ApiError>
where
  S: SubscriptionStore,
{
  let plan = Plan::from_label(&body.plan)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let photo = body
    .photo
    .as_deref()
    .map(|p| BASE64.decode(p))
    .transpose()
    .map_err(|e| ApiError::BadRequest(format!("invalid photo encoding: {e}")))?;

  let input = NewCustomer::new(
    body.name,
    body.contact,
    photo,
    &body.family_members,
    plan,
    Local::now().date_naive(),
  )
  .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let customer = state
    .store
    .register(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(customer_id = customer.id, plan = plan.label(), "registered customer");
  Ok((StatusCode::CREATED, Json(customer)))
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /customers/names`
pub async fn names<S, N, B>(
  State(state): State<ApiState<S, N, B>>,
) -> Result<Json<Vec<CustomerSummary>>, ApiError>
where
  S: SubscriptionStore,
{
  let summaries = state
    .store
    .list_customers()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(summaries))
}

/// `GET /customers` — the full table view.
pub async fn table<S, N, B>(
  State(state): State<ApiState<S, N, B>>,
) -> Result<Json<Vec<CustomerRow>>, ApiError>
where
  S: SubscriptionStore,
{
  let rows = state
    .store
    .customer_table()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(rows))
}

/// `GET /customers/:id`
pub async fn get_one<S, N, B>(
  State(state): State<ApiState<S, N, B>>,
  Path(id): Path<i64>,
) -> Result<Json<Customer>, ApiError>
where
  S: SubscriptionStore,
{
  let customer = state
    .store
    .get_customer(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("customer {id} not found")))?;
  Ok(Json(customer))
}
