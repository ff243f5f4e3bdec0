//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates go through rusqlite's `chrono` feature as ISO 8601 text. Family
//! members are stored as a compact JSON array. Plans are stored as their
//! literal form labels.

use chrono::NaiveDate;
use glasskeep_core::{customer::Customer, plan::Plan};

use crate::{Error, Result};

// ─── Plan ────────────────────────────────────────────────────────────────────

pub fn encode_plan(plan: Plan) -> &'static str { plan.label() }

/// A label that fails to parse here means the row predates the plan table or
/// was written by something else entirely; surface it as corruption rather
/// than a validation error.
pub fn decode_plan(label: &str) -> Result<Plan> {
  Plan::from_label(label).map_err(|_| Error::CorruptPlan(label.to_owned()))
}

// ─── Family members ──────────────────────────────────────────────────────────

pub fn encode_family_members(names: &[String]) -> Result<String> {
  Ok(serde_json::to_string(names)?)
}

pub fn decode_family_members(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `customers` row.
pub struct RawCustomer {
  pub id: i64,
  pub name: String,
  pub contact: String,
  pub photo_id: Option<Vec<u8>>,
  pub subscription_start_date: NaiveDate,
  pub remaining_changes: i64,
  pub validity_period: i64,
  pub family_members: String,
  pub plan: String,
}

impl RawCustomer {
  pub fn into_customer(self) -> Result<Customer> {
    Ok(Customer {
      id: self.id,
      name: self.name,
      contact: self.contact,
      photo_id: self.photo_id,
      subscription_start_date: self.subscription_start_date,
      // The CHECK constraint keeps both columns non-negative.
      remaining_changes: self.remaining_changes as u32,
      validity_period: self.validity_period as u32,
      family_members: decode_family_members(&self.family_members)?,
      plan: decode_plan(&self.plan)?,
    })
  }
}
