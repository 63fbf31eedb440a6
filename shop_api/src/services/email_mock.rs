// shop_api/src/services/email_mock.rs

//! A mailer that only logs. Sent messages are kept in an outbox for inspection.

use crate::errors::Result as AppResult;
use parking_lot::Mutex;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SentEmailInfo {
  pub to: String,
  pub from: String,
  pub subject: String,
  pub body_preview: String,
  pub message_id: String,
}

#[derive(Debug)]
pub struct MockMailer {
  sender: String,
  latency: Duration,
  outbox: Mutex<Vec<SentEmailInfo>>,
}

impl MockMailer {
  pub fn new(sender: impl Into<String>) -> Self {
    Self {
      sender: sender.into(),
      latency: Duration::from_millis(20),
      outbox: Mutex::new(Vec::new()),
    }
  }

  pub async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<SentEmailInfo> {
    info!(to, from = %self.sender, subject, "Simulating sending email.");
    tokio::time::sleep(self.latency).await;

    let mut body_preview: String = html_body.chars().take(50).collect();
    body_preview.push_str("...");
    let sent = SentEmailInfo {
      to: to.to_string(),
      from: self.sender.clone(),
      subject: subject.to_string(),
      body_preview,
      message_id: format!("mock_email_{}", uuid::Uuid::new_v4()),
    };
    info!(message_id = %sent.message_id, "Mock email sent.");
    self.outbox.lock().push(sent.clone());
    Ok(sent)
  }

  pub fn sent(&self) -> Vec<SentEmailInfo> {
    self.outbox.lock().clone()
  }
}
