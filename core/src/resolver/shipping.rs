// checkout_core/src/resolver/shipping.rs

use serde::{Deserialize, Serialize};

use crate::model::channel::ChannelCode;
use crate::model::order::{Order, Shipment};

/// A configured shipping method with a flat fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
  pub code: String,
  pub name: String,
  #[serde(default = "enabled_by_default")]
  pub enabled: bool,
  pub channels: Vec<ChannelCode>,
  #[serde(default)]
  pub fee: i64,
  /// Heaviest order (grams) this method will carry.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_weight: Option<u64>,
  #[serde(default)]
  pub position: i32,
}

fn enabled_by_default() -> bool {
  true
}

impl ShippingMethod {
  pub fn ships(&self, order: &Order) -> bool {
    self.enabled
      && self.channels.contains(&order.channel)
      && self.max_weight.map_or(true, |max| order.total_weight() <= max)
  }
}

/// Computes which shipping methods are offered for a shipment.
pub trait ShippingMethodsResolver: Send + Sync {
  fn offered_methods(&self, order: &Order, shipment: &Shipment) -> Vec<ShippingMethod>;
}

#[derive(Debug, Clone, Default)]
pub struct ConfiguredShippingMethodsResolver {
  methods: Vec<ShippingMethod>,
}

impl ConfiguredShippingMethodsResolver {
  pub fn new(mut methods: Vec<ShippingMethod>) -> Self {
    methods.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.code.cmp(&b.code)));
    Self { methods }
  }
}

impl ShippingMethodsResolver for ConfiguredShippingMethodsResolver {
  fn offered_methods(&self, order: &Order, _shipment: &Shipment) -> Vec<ShippingMethod> {
    self.methods.iter().filter(|m| m.ships(order)).cloned().collect()
  }
}
