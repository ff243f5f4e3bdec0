//! Customer — one subscription record.
//!
//! A customer is created once at registration and only ever mutated by
//! decrementing `remaining_changes`; there is no update or delete path.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, plan::Plan};

/// A registered subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
  /// Assigned by the store on creation; immutable.
  pub id: i64,
  pub name: String,
  /// Free text; in practice holds an email address.
  pub contact: String,
  /// Uploaded photo-ID image. Opaque — nothing inspects the bytes.
  #[serde(default, with = "photo_b64", skip_serializing_if = "Option::is_none")]
  pub photo_id: Option<Vec<u8>>,
  /// Set once at registration; immutable.
  pub subscription_start_date: NaiveDate,
  /// Days the subscription remains active from the start date. Fixed by the
  /// plan at registration.
  pub validity_period: u32,
  /// Glass changes still permitted. Monotonically decreasing, never below
  /// zero.
  pub remaining_changes: u32,
  /// Ordered free-text names; may be empty.
  pub family_members: Vec<String>,
  /// Inert historical metadata after registration.
  pub plan: Plan,
}

impl Customer {
  /// The last day on which a glass change may still be logged.
  pub fn expiry_date(&self) -> NaiveDate {
    self.subscription_start_date + Days::new(u64::from(self.validity_period))
  }

  /// Whether the subscription has lapsed as of `date`. The expiry day itself
  /// is still inside the window.
  pub fn is_expired_on(&self, date: NaiveDate) -> bool {
    date > self.expiry_date()
  }

  /// Project into the flat row shape used by the customer table view.
  pub fn to_row(&self) -> CustomerRow {
    CustomerRow {
      id: self.id,
      name: self.name.clone(),
      contact: self.contact.clone(),
      subscription_start_date: self.subscription_start_date,
      remaining_changes: self.remaining_changes,
      validity_period: self.validity_period,
      plan: self.plan.label().to_owned(),
      family_members: self.family_members.join(", "),
    }
  }
}

// ─── Registration input ──────────────────────────────────────────────────────

/// Input to [`crate::store::SubscriptionStore::register`].
///
/// `remaining_changes` and `validity_period` are not accepted from callers —
/// the store derives both from `plan`.
#[derive(Debug, Clone)]
pub struct NewCustomer {
  pub name: String,
  pub contact: String,
  pub photo_id: Option<Vec<u8>>,
  pub subscription_start_date: NaiveDate,
  pub family_members: Vec<String>,
  pub plan: Plan,
}

impl NewCustomer {
  /// Build a validated registration for `start_date`. `name` and `contact`
  /// must be non-blank; `family_members` is the raw comma-separated form
  /// field.
  pub fn new(
    name: impl Into<String>,
    contact: impl Into<String>,
    photo_id: Option<Vec<u8>>,
    family_members: &str,
    plan: Plan,
    start_date: NaiveDate,
  ) -> Result<Self> {
    let name = name.into();
    let contact = contact.into();
    if name.trim().is_empty() {
      return Err(Error::MissingField("name"));
    }
    if contact.trim().is_empty() {
      return Err(Error::MissingField("contact"));
    }
    Ok(Self {
      name,
      contact,
      photo_id,
      subscription_start_date: start_date,
      family_members: parse_family_members(family_members),
      plan,
    })
  }
}

/// Split a comma-separated list of names, trimming whitespace and dropping
/// empty entries. An empty input yields an empty list, not one blank name.
pub fn parse_family_members(input: &str) -> Vec<String> {
  input
    .split(',')
    .map(str::trim)
    .filter(|name| !name.is_empty())
    .map(str::to_owned)
    .collect()
}

// ─── Projections ─────────────────────────────────────────────────────────────

/// `(id, name)` pair for populating selection controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
  pub id:   i64,
  pub name: String,
}

/// One row of the customer table view; `family_members` is re-joined into a
/// comma-separated display string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRow {
  pub id: i64,
  pub name: String,
  pub contact: String,
  pub subscription_start_date: NaiveDate,
  pub remaining_changes: u32,
  pub validity_period: u32,
  pub plan: String,
  pub family_members: String,
}

// ─── Photo serde helper ──────────────────────────────────────────────────────

/// Serialize the photo blob as base64 in JSON.
mod photo_b64 {
  use base64::{Engine as _, engine::general_purpose::STANDARD};
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(
    bytes: &Option<Vec<u8>>,
    ser: S,
  ) -> Result<S::Ok, S::Error> {
    match bytes {
      Some(b) => ser.serialize_str(&STANDARD.encode(b)),
      None => ser.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    de: D,
  ) -> Result<Option<Vec<u8>>, D::Error> {
    let encoded: Option<String> = Option::deserialize(de)?;
    encoded
      .map(|s| STANDARD.decode(s).map_err(D::Error::custom))
      .transpose()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn customer(start: NaiveDate, validity: u32) -> Customer {
    Customer {
      id: 1,
      name: "A".into(),
      contact: "a@x.com".into(),
      photo_id: None,
      subscription_start_date: start,
      validity_period: validity,
      remaining_changes: 3,
      family_members: vec![],
      plan: Plan::ThreeIn90,
    }
  }

  #[test]
  fn family_members_parse_trims_and_preserves_order() {
    assert_eq!(parse_family_members("Bob, Carol"), vec!["Bob", "Carol"]);
    assert_eq!(parse_family_members(" Dee ,Eve,  "), vec!["Dee", "Eve"]);
  }

  #[test]
  fn empty_family_members_yield_empty_list() {
    assert!(parse_family_members("").is_empty());
    assert!(parse_family_members("  ").is_empty());
  }

  #[test]
  fn expiry_day_is_still_inside_the_window() {
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let c = customer(start, 90);
    assert_eq!(c.expiry_date(), NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
    assert!(!c.is_expired_on(c.expiry_date()));
    assert!(c.is_expired_on(c.expiry_date() + Days::new(1)));
  }

  #[test]
  fn registration_rejects_blank_required_fields() {
    let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let err =
      NewCustomer::new("  ", "a@x.com", None, "", Plan::ThreeIn90, today)
        .unwrap_err();
    assert!(matches!(err, Error::MissingField("name")));

    let err = NewCustomer::new("A", "", None, "", Plan::ThreeIn90, today)
      .unwrap_err();
    assert!(matches!(err, Error::MissingField("contact")));
  }

  #[test]
  fn row_projection_joins_family_members() {
    let mut c = customer(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 90);
    c.family_members = vec!["Bob".into(), "Carol".into()];
    assert_eq!(c.to_row().family_members, "Bob, Carol");
    assert_eq!(c.to_row().plan, Plan::ThreeIn90.label());
  }
}
