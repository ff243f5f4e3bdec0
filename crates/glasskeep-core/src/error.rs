//! Error types for `glasskeep-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("unknown plan: {0:?}")]
  UnknownPlan(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure modes of [`crate::store::SubscriptionStore::log_change`].
///
/// The first three variants are business outcomes — the store checked the
/// subscription and declined to write anything. `Store` carries a genuine
/// backend failure.
#[derive(Debug, Error)]
pub enum ChangeError<E>
where
  E: std::error::Error + 'static,
{
  #[error("customer not found: {0}")]
  CustomerNotFound(i64),

  #[error("subscription for customer {customer_id} expired on {expired_on}")]
  SubscriptionExpired {
    customer_id: i64,
    expired_on:  NaiveDate,
  },

  #[error("customer {0} has no remaining glass changes")]
  QuotaExhausted(i64),

  #[error("store error: {0}")]
  Store(#[source] E),
}
