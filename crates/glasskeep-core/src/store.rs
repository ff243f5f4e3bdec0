//! The `SubscriptionStore` trait.
//!
//! Implemented by storage backends (e.g. `glasskeep-store-sqlite`). Higher
//! layers (`glasskeep-api`, `glasskeep-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  change::{ChangeReceipt, GlassChange},
  customer::{Customer, CustomerRow, CustomerSummary, NewCustomer},
  error::ChangeError,
};

/// Abstraction over a Glasskeep storage backend.
///
/// Customers are written once at registration; the only subsequent mutation
/// is the quota decrement inside [`log_change`](Self::log_change), which the
/// backend must commit atomically with its change-log insert.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SubscriptionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Registration ──────────────────────────────────────────────────────

  /// Persist a new customer, deriving `remaining_changes` and
  /// `validity_period` from the plan. The store assigns the id; on return
  /// the row is durably committed. Storage failure leaves no partial write.
  fn register(
    &self,
    input: NewCustomer,
  ) -> impl Future<Output = Result<Customer, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a customer by id. Returns `None` if not found.
  fn get_customer(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  /// All customers as `(id, name)` pairs, ordered by id. Used to populate
  /// selection controls.
  fn list_customers(
    &self,
  ) -> impl Future<Output = Result<Vec<CustomerSummary>, Self::Error>> + Send + '_;

  /// Full-table projection of every customer, ordered by id, with family
  /// members re-joined into a display string. No filtering or pagination.
  fn customer_table(
    &self,
  ) -> impl Future<Output = Result<Vec<CustomerRow>, Self::Error>> + Send + '_;

  /// All logged changes for a customer, oldest first.
  fn changes_for(
    &self,
    customer_id: i64,
  ) -> impl Future<Output = Result<Vec<GlassChange>, Self::Error>> + Send + '_;

  // ── The one decision path ─────────────────────────────────────────────

  /// Verify the subscription and log a glass change dated `on`.
  ///
  /// Fails without writing anything if the customer is unknown, the
  /// subscription has expired (`on` past the validity window — checked
  /// before the quota), or the quota is exhausted. On success exactly one
  /// change-log row is inserted and `remaining_changes` is decremented by
  /// exactly one, committed as a single unit. Concurrent calls for the same
  /// customer must not drive the quota negative.
  fn log_change(
    &self,
    customer_id: i64,
    on: NaiveDate,
  ) -> impl Future<Output = Result<ChangeReceipt, ChangeError<Self::Error>>> + Send + '_;
}
