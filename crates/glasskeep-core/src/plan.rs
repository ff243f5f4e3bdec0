//! Subscription plans — the fixed tiers a customer signs up under.
//!
//! A plan fully determines the initial change quota and the validity window;
//! neither is ever edited independently after registration. The variant
//! labels are the literal strings the business uses on its sign-up forms, so
//! they double as the wire and storage encoding.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A named subscription tier fixing the initial change quota and validity
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
  #[serde(rename = "3 Glass Changes in 3 Months - 3000 Rs")]
  ThreeIn90,
  #[serde(rename = "6 Glass Changes in 6 Months - 6000 Rs")]
  SixIn180,
}

impl Plan {
  /// Every recognised plan, in sign-up-form order.
  pub const ALL: [Plan; 2] = [Plan::ThreeIn90, Plan::SixIn180];

  /// The literal label shown on the sign-up form and stored in the database.
  pub fn label(self) -> &'static str {
    match self {
      Plan::ThreeIn90 => "3 Glass Changes in 3 Months - 3000 Rs",
      Plan::SixIn180 => "6 Glass Changes in 6 Months - 6000 Rs",
    }
  }

  /// Parse a plan label. Anything but the two recognised labels is rejected;
  /// there is no undefined fall-through.
  pub fn from_label(label: &str) -> Result<Plan> {
    Plan::ALL
      .into_iter()
      .find(|p| p.label() == label)
      .ok_or_else(|| Error::UnknownPlan(label.to_owned()))
  }

  /// Number of glass changes the plan grants at registration.
  pub fn change_quota(self) -> u32 {
    match self {
      Plan::ThreeIn90 => 3,
      Plan::SixIn180 => 6,
    }
  }

  /// Days the subscription remains active from its start date.
  pub fn validity_days(self) -> u32 {
    match self {
      Plan::ThreeIn90 => 90,
      Plan::SixIn180 => 180,
    }
  }
}
