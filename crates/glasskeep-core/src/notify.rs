//! Notification boundary — fire-and-forget messages to a customer's contact
//! address.
//!
//! Delivery runs after the change-log commit and is intentionally decoupled
//! from it: a failed send never rolls the change back, it is only reported
//! to the caller as a partial-success outcome.

use std::future::Future;

use thiserror::Error;

/// A notification that could not be delivered. Non-fatal by contract.
#[derive(Debug, Clone, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// External collaborator that delivers a `(recipient, subject, body)`
/// message.
pub trait Notifier: Send + Sync {
  fn notify<'a>(
    &'a self,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
  ) -> impl Future<Output = Result<(), NotifyError>> + Send + 'a;
}
