// shop_api/src/web/views.rs

//! Response bodies rendered from the order aggregate.

use checkout_core::{Address, CheckoutState, LineItem, Order, OrderToken, Payment, Shipment};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsView {
  pub items: i64,
  pub shipping: i64,
  pub total: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
  pub token: OrderToken,
  pub channel: String,
  pub currency: String,
  pub checkout_state: CheckoutState,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub customer_email: Option<String>,
  pub items: Vec<LineItem>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub billing_address: Option<Address>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub shipping_address: Option<Address>,
  pub shipments: Vec<Shipment>,
  pub payments: Vec<Payment>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  pub totals: TotalsView,
}

impl From<Order> for OrderView {
  fn from(order: Order) -> Self {
    let totals = TotalsView {
      items: order.items_total(),
      shipping: order.shipping_total(),
      total: order.total(),
    };
    Self {
      token: order.token,
      channel: order.channel.to_string(),
      currency: order.currency,
      checkout_state: order.state,
      customer_email: order.customer.map(|c| c.email.to_string()),
      items: order.items,
      billing_address: order.billing_address,
      shipping_address: order.shipping_address,
      shipments: order.shipments,
      payments: order.payments,
      notes: order.notes,
      totals,
    }
  }
}
