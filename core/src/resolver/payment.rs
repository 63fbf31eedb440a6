// checkout_core/src/resolver/payment.rs

//! Payment-method eligibility.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::channel::ChannelCode;
use crate::model::order::{Order, Payment};

/// A configured payment method and the rules restricting where it may be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
  pub code: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default = "enabled_by_default")]
  pub enabled: bool,
  pub channels: Vec<ChannelCode>,
  /// Allowed currencies; empty allows any.
  #[serde(default)]
  pub currencies: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_amount: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_amount: Option<i64>,
  #[serde(default)]
  pub position: i32,
}

fn enabled_by_default() -> bool {
  true
}

impl PaymentMethod {
  /// Whether this method may pay `payment` of `order`.
  pub fn accepts(&self, order: &Order, payment: &Payment) -> bool {
    self.enabled
      && self.channels.contains(&order.channel)
      && (self.currencies.is_empty() || self.currencies.iter().any(|c| c == &payment.currency))
      && self.min_amount.map_or(true, |min| payment.amount >= min)
      && self.max_amount.map_or(true, |max| payment.amount <= max)
  }
}

/// Computes which payment methods a shopper may legally pick for a payment.
///
/// Implementations must be side-effect free and must not cache across calls: the
/// answer depends on the order's current total and channel.
pub trait PaymentMethodsResolver: Send + Sync {
  fn eligible_methods(&self, order: &Order, payment: &Payment) -> Vec<PaymentMethod>;

  fn eligible_codes(&self, order: &Order, payment: &Payment) -> BTreeSet<String> {
    self
      .eligible_methods(order, payment)
      .into_iter()
      .map(|m| m.code)
      .collect()
  }

  fn is_eligible(&self, order: &Order, payment: &Payment, code: &str) -> bool {
    self.eligible_codes(order, payment).contains(code)
  }
}

/// Resolver over a static list of configured methods, ordered by position then code.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPaymentMethodsResolver {
  methods: Vec<PaymentMethod>,
}

impl ConfiguredPaymentMethodsResolver {
  pub fn new(mut methods: Vec<PaymentMethod>) -> Self {
    methods.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.code.cmp(&b.code)));
    Self { methods }
  }

  pub fn methods(&self) -> &[PaymentMethod] {
    &self.methods
  }
}

impl PaymentMethodsResolver for ConfiguredPaymentMethodsResolver {
  fn eligible_methods(&self, order: &Order, payment: &Payment) -> Vec<PaymentMethod> {
    self
      .methods
      .iter()
      .filter(|m| m.accepts(order, payment))
      .cloned()
      .collect()
  }
}
