//! JSON REST API for Glasskeep.
//!
//! Exposes an axum [`Router`] backed by any
//! [`glasskeep_core::store::SubscriptionStore`], with optional notification
//! and backup collaborators. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", glasskeep_api::api_router(state))
//! ```

pub mod changes;
pub mod customers;
pub mod error;
pub mod maintenance;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use glasskeep_core::{
  backup::BackupTarget, notify::Notifier, store::SubscriptionStore,
};

pub use error::ApiError;

#[cfg(test)]
mod tests;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state handed to every handler.
///
/// `notifier` and `backup` are optional: an admin deployment without mail or
/// backup configuration still serves the core operations, and the affected
/// endpoints degrade explicitly (notification reported as `skipped`, backup
/// rejected as unconfigured).
pub struct ApiState<S, N, B> {
  pub store:    Arc<S>,
  pub notifier: Option<Arc<N>>,
  pub backup:   Option<Arc<B>>,
}

// Manual impl: `#[derive(Clone)]` would demand Clone of S, N, and B.
impl<S, N, B> Clone for ApiState<S, N, B> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      notifier: self.notifier.clone(),
      backup:   self.backup.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N, B>(state: ApiState<S, N, B>) -> Router<()>
where
  S: SubscriptionStore + 'static,
  N: Notifier + 'static,
  B: BackupTarget + 'static,
{
  Router::new()
    // Customers
    .route(
      "/customers",
      get(customers::table::<S, N, B>).post(customers::register::<S, N, B>),
    )
    .route("/customers/names", get(customers::names::<S, N, B>))
    .route("/customers/{id}", get(customers::get_one::<S, N, B>))
    // Glass changes
    .route(
      "/customers/{id}/changes",
      get(changes::history::<S, N, B>).post(changes::log::<S, N, B>),
    )
    // Maintenance
    .route("/backup", post(maintenance::backup::<S, N, B>))
    .with_state(state)
}
