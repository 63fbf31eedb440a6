use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CheckoutError, CheckoutResult};
use crate::model::channel::ChannelCode;

/// A sellable product as the checkout sees it: code, price in minor units and weight in grams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub code: String,
  pub name: String,
  pub price: i64,
  #[serde(default)]
  pub weight: u32,
  /// Channels the product is sold in; empty means every channel.
  #[serde(default)]
  pub channels: Vec<ChannelCode>,
}

impl Product {
  pub fn is_available_in(&self, channel: &ChannelCode) -> bool {
    self.channels.is_empty() || self.channels.contains(channel)
  }
}

#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
  products: HashMap<String, Product>,
}

impl ProductCatalog {
  pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
    Self {
      products: products.into_iter().map(|p| (p.code.clone(), p)).collect(),
    }
  }

  /// Finds a product sold in `channel`.
  pub fn find(&self, code: &str, channel: &ChannelCode) -> CheckoutResult<&Product> {
    self
      .products
      .get(code)
      .filter(|product| product.is_available_in(channel))
      .ok_or_else(|| CheckoutError::ProductNotFound { code: code.to_string() })
  }
}
