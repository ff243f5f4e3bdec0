//! Glass-change events — append-only redemptions of a subscription's quota.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One logged glass change. Rows are append-only; never mutated or deleted.
/// `customer_id` is not FK-enforced, so a row can outlive its customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlassChange {
  pub id:          i64,
  pub customer_id: i64,
  pub change_date: NaiveDate,
}

/// Result of a successful [`crate::store::SubscriptionStore::log_change`]:
/// the recorded event paired with the quota left after the decrement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeReceipt {
  pub change:            GlassChange,
  pub remaining_changes: u32,
}
