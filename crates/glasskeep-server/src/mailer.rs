//! [`HttpMailer`] — delivers change notifications through a transactional
//! mail HTTP API (JSON POST with an `api-key` header).

use std::time::Duration;

use glasskeep_core::notify::{Notifier, NotifyError};
use serde::Serialize;

use crate::NotifyConfig;

/// Notifier backed by an HTTP mail service.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpMailer {
  client: reqwest::Client,
  config: NotifyConfig,
}

#[derive(Serialize)]
struct MailSender<'a> {
  name:  &'a str,
  email: &'a str,
}

#[derive(Serialize)]
struct MailRecipient<'a> {
  email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MailPayload<'a> {
  sender:       MailSender<'a>,
  to:           Vec<MailRecipient<'a>>,
  subject:      &'a str,
  text_content: &'a str,
}

impl HttpMailer {
  pub fn new(config: NotifyConfig) -> Result<Self, NotifyError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| NotifyError(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client, config })
  }
}

impl Notifier for HttpMailer {
  async fn notify(
    &self,
    to: &str,
    subject: &str,
    body: &str,
  ) -> Result<(), NotifyError> {
    let payload = MailPayload {
      sender: MailSender {
        name:  &self.config.sender_name,
        email: &self.config.sender_address,
      },
      to: vec![MailRecipient { email: to }],
      subject,
      text_content: body,
    };

    let resp = self
      .client
      .post(&self.config.api_url)
      .header("api-key", &self.config.api_key)
      .json(&payload)
      .send()
      .await
      .map_err(|e| NotifyError(e.to_string()))?;

    if !resp.status().is_success() {
      let status = resp.status();
      let detail = resp.text().await.unwrap_or_default();
      return Err(NotifyError(format!("mail API returned {status}: {detail}")));
    }
    Ok(())
  }
}
