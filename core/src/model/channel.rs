use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{CheckoutError, CheckoutResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelCode(String);

impl ChannelCode {
  pub fn new(code: impl Into<String>) -> Self {
    Self(code.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ChannelCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ChannelCode {
  fn from(code: &str) -> Self {
    Self::new(code)
  }
}

/// A sales context. Orders, shipping and payment methods are scoped to channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
  pub code: ChannelCode,
  pub name: String,
  pub base_currency: String,
  #[serde(default = "enabled_by_default")]
  pub enabled: bool,
}

fn enabled_by_default() -> bool {
  true
}

/// Configured channels, looked up by code.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
  channels: HashMap<ChannelCode, Channel>,
}

impl ChannelRegistry {
  pub fn new(channels: impl IntoIterator<Item = Channel>) -> Self {
    Self {
      channels: channels.into_iter().map(|c| (c.code.clone(), c)).collect(),
    }
  }

  /// Returns the channel if it exists and is enabled.
  pub fn find(&self, code: &str) -> CheckoutResult<&Channel> {
    self
      .channels
      .get(&ChannelCode::new(code))
      .filter(|channel| channel.enabled)
      .ok_or_else(|| CheckoutError::ChannelNotFound {
        channel: code.to_string(),
      })
  }

  pub fn len(&self) -> usize {
    self.channels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.channels.is_empty()
  }
}
