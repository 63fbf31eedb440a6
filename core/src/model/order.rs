// checkout_core/src/model/order.rs

//! The order aggregate and its checkout state machine.
//!
//! Every command a shopper can issue is an explicit transition method on [`Order`].
//! Transitions validate their preconditions first and only mutate once all of them
//! hold, so a failed transition leaves the order untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::authorization::{Authorization, AuthorizationGate};
use crate::error::{CheckoutError, CheckoutResult, MethodKind};
use crate::model::address::Address;
use crate::model::catalog::Product;
use crate::model::channel::{Channel, ChannelCode};
use crate::model::customer::{CustomerProvider, CustomerRef, Email, Principal};
use crate::resolver::payment::PaymentMethodsResolver;
use crate::resolver::shipping::ShippingMethodsResolver;

/// Checkout progress. Variants are ordered: a later variant implies every earlier step was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
  Cart,
  Addressed,
  ShippingSelected,
  PaymentSelected,
  Completed,
}

impl fmt::Display for CheckoutState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      CheckoutState::Cart => "cart",
      CheckoutState::Addressed => "addressed",
      CheckoutState::ShippingSelected => "shipping_selected",
      CheckoutState::PaymentSelected => "payment_selected",
      CheckoutState::Completed => "completed",
    };
    f.write_str(name)
  }
}

/// Opaque cart token correlating a shopping session with its order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderToken(String);

impl OrderToken {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  /// A fresh random token for carts picked up without one.
  pub fn generate() -> Self {
    Self(uuid::Uuid::new_v4().simple().to_string().to_uppercase())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for OrderToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for OrderToken {
  fn from(token: &str) -> Self {
    Self::new(token)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentId(pub u32);

impl fmt::Display for PaymentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

impl fmt::Display for ShipmentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
  pub product_code: String,
  pub product_name: String,
  pub quantity: u32,
  pub unit_price: i64,
  pub unit_weight: u32,
}

impl LineItem {
  pub fn total(&self) -> i64 {
    self.unit_price * i64::from(self.quantity)
  }

  pub fn total_weight(&self) -> u64 {
    u64::from(self.unit_weight) * u64::from(self.quantity)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
  pub id: ShipmentId,
  pub method: Option<String>,
  pub fee: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
  pub id: PaymentId,
  pub amount: i64,
  pub currency: String,
  pub method: Option<String>,
}

/// Input of the terminal checkout transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
  pub email: Option<Email>,
  pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub token: OrderToken,
  pub channel: ChannelCode,
  pub currency: String,
  pub customer: Option<CustomerRef>,
  pub items: Vec<LineItem>,
  pub billing_address: Option<Address>,
  pub shipping_address: Option<Address>,
  pub shipments: Vec<Shipment>,
  pub payments: Vec<Payment>,
  pub state: CheckoutState,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
  /// Starts a new cart in `channel`. The currency is fixed to the channel's base currency.
  pub fn pickup(token: OrderToken, channel: &Channel, customer: Option<CustomerRef>) -> Self {
    let now = Utc::now();
    Self {
      token,
      channel: channel.code.clone(),
      currency: channel.base_currency.clone(),
      customer,
      items: Vec::new(),
      billing_address: None,
      shipping_address: None,
      shipments: Vec::new(),
      payments: Vec::new(),
      state: CheckoutState::Cart,
      notes: None,
      created_at: now,
      updated_at: now,
      completed_at: None,
    }
  }

  pub fn is_completed(&self) -> bool {
    self.state == CheckoutState::Completed
  }

  pub fn items_total(&self) -> i64 {
    self.items.iter().map(LineItem::total).sum()
  }

  pub fn shipping_total(&self) -> i64 {
    self.shipments.iter().map(|s| s.fee).sum()
  }

  pub fn total(&self) -> i64 {
    self.items_total() + self.shipping_total()
  }

  pub fn total_weight(&self) -> u64 {
    self.items.iter().map(LineItem::total_weight).sum()
  }

  pub fn total_quantity(&self) -> u64 {
    self.items.iter().map(|i| u64::from(i.quantity)).sum()
  }

  pub fn payment(&self, id: PaymentId) -> CheckoutResult<&Payment> {
    self
      .payments
      .iter()
      .find(|p| p.id == id)
      .ok_or_else(|| CheckoutError::PaymentNotFound {
        token: self.token.to_string(),
        payment_id: id.0,
      })
  }

  pub fn shipment(&self, id: ShipmentId) -> CheckoutResult<&Shipment> {
    self
      .shipments
      .iter()
      .find(|s| s.id == id)
      .ok_or_else(|| CheckoutError::ShipmentNotFound {
        token: self.token.to_string(),
        shipment_id: id.0,
      })
  }

  // --- Transitions ---

  /// Adds `quantity` units of `product`, merging with an existing line for the same product.
  pub fn add_item(&mut self, product: &Product, quantity: u32) -> CheckoutResult<CheckoutState> {
    self.ensure_mutable()?;
    if quantity == 0 {
      return Err(CheckoutError::InvalidQuantity { quantity });
    }

    match self.items.iter_mut().find(|i| i.product_code == product.code) {
      Some(item) => item.quantity = item.quantity.saturating_add(quantity),
      None => self.items.push(LineItem {
        product_code: product.code.clone(),
        product_name: product.name.clone(),
        quantity,
        unit_price: product.price,
        unit_weight: product.weight,
      }),
    }
    debug!(token = %self.token, product = %product.code, quantity, "Item added to cart.");
    self.recalculate();
    Ok(self.state)
  }

  pub fn change_item_quantity(&mut self, product_code: &str, quantity: u32) -> CheckoutResult<CheckoutState> {
    self.ensure_mutable()?;
    if quantity == 0 {
      return Err(CheckoutError::InvalidQuantity { quantity });
    }
    let item = self
      .items
      .iter_mut()
      .find(|i| i.product_code == product_code)
      .ok_or_else(|| CheckoutError::ItemNotFound {
        product_code: product_code.to_string(),
      })?;
    item.quantity = quantity;
    self.recalculate();
    Ok(self.state)
  }

  /// Removes a line. Emptying the cart sends the order back to [`CheckoutState::Cart`].
  pub fn remove_item(&mut self, product_code: &str) -> CheckoutResult<CheckoutState> {
    self.ensure_mutable()?;
    let idx = self
      .items
      .iter()
      .position(|i| i.product_code == product_code)
      .ok_or_else(|| CheckoutError::ItemNotFound {
        product_code: product_code.to_string(),
      })?;
    self.items.remove(idx);
    if self.items.is_empty() {
      self.shipments.clear();
      self.state = CheckoutState::Cart;
    }
    self.recalculate();
    Ok(self.state)
  }

  /// Sets billing and shipping addresses. Billing defaults to the shipping address.
  ///
  /// Re-applying identical addresses is a no-op. Changing them from a later state
  /// moves the order back to `Addressed` and clears chosen shipping methods.
  pub fn address(&mut self, billing: Option<Address>, shipping: Address) -> CheckoutResult<CheckoutState> {
    self.ensure_mutable()?;
    if self.items.is_empty() {
      return Err(CheckoutError::EmptyCart {
        token: self.token.to_string(),
      });
    }

    let billing = billing.unwrap_or_else(|| shipping.clone());
    if self.state >= CheckoutState::Addressed
      && self.billing_address.as_ref() == Some(&billing)
      && self.shipping_address.as_ref() == Some(&shipping)
    {
      debug!(token = %self.token, "Identical addresses re-applied, nothing to do.");
      return Ok(self.state);
    }

    self.billing_address = Some(billing);
    self.shipping_address = Some(shipping);
    if self.shipments.is_empty() {
      self.shipments.push(Shipment {
        id: ShipmentId(0),
        method: None,
        fee: 0,
      });
    } else {
      for shipment in &mut self.shipments {
        shipment.method = None;
        shipment.fee = 0;
      }
    }
    self.state = CheckoutState::Addressed;
    self.recalculate();
    Ok(self.state)
  }

  pub fn choose_shipping_method(
    &mut self,
    shipment_id: ShipmentId,
    code: &str,
    resolver: &dyn ShippingMethodsResolver,
  ) -> CheckoutResult<CheckoutState> {
    self.ensure_mutable()?;
    self.ensure_reached(CheckoutState::Addressed, "choose a shipping method")?;
    let shipment = self.shipment(shipment_id)?;
    let method = resolver
      .offered_methods(self, shipment)
      .into_iter()
      .find(|m| m.code == code)
      .ok_or_else(|| CheckoutError::InvalidMethod {
        kind: MethodKind::Shipping,
        code: code.to_string(),
      })?;

    if let Some(shipment) = self.shipments.iter_mut().find(|s| s.id == shipment_id) {
      shipment.method = Some(method.code.clone());
      shipment.fee = method.fee;
    }
    self.state = CheckoutState::ShippingSelected;
    self.recalculate();
    Ok(self.state)
  }

  pub fn choose_payment_method(
    &mut self,
    payment_id: PaymentId,
    code: &str,
    resolver: &dyn PaymentMethodsResolver,
  ) -> CheckoutResult<CheckoutState> {
    self.ensure_mutable()?;
    self.ensure_reached(CheckoutState::ShippingSelected, "choose a payment method")?;
    let payment = self.payment(payment_id)?;
    if !resolver.is_eligible(self, payment, code) {
      return Err(CheckoutError::InvalidMethod {
        kind: MethodKind::Payment,
        code: code.to_string(),
      });
    }

    if let Some(payment) = self.payments.iter_mut().find(|p| p.id == payment_id) {
      payment.method = Some(code.to_string());
    }
    self.state = CheckoutState::PaymentSelected;
    self.touch();
    Ok(self.state)
  }

  /// Terminal transition. Nothing is mutated unless every check passes.
  pub fn complete(
    &mut self,
    request: CompletionRequest,
    principal: &Principal,
    customers: &dyn CustomerProvider,
    gate: &AuthorizationGate,
    shipping_methods: &dyn ShippingMethodsResolver,
    payment_methods: &dyn PaymentMethodsResolver,
  ) -> CheckoutResult<CheckoutState> {
    self.ensure_mutable()?;
    if self.state != CheckoutState::PaymentSelected {
      return Err(CheckoutError::InvalidState {
        action: "complete checkout",
        actual: self.state,
      });
    }

    let customer = match (&self.customer, &request.email) {
      (Some(existing), _) => existing.clone(),
      (None, Some(email)) => customers.provide(email),
      (None, None) => principal.customer_ref().ok_or(CheckoutError::EmailRequired)?,
    };

    if let Authorization::Deny(reason) = gate.authorize(Some(&customer), principal) {
      return Err(CheckoutError::Unauthorized(reason));
    }

    // Cart edits and config changes can invalidate methods picked earlier.
    for shipment in &self.shipments {
      let code = shipment.method.as_deref().unwrap_or_default();
      let offered = shipping_methods.offered_methods(self, shipment);
      if !offered.iter().any(|m| m.code == code) {
        return Err(CheckoutError::InvalidMethod {
          kind: MethodKind::Shipping,
          code: code.to_string(),
        });
      }
    }
    for payment in &self.payments {
      let code = payment.method.as_deref().unwrap_or_default();
      if !payment_methods.is_eligible(self, payment, code) {
        return Err(CheckoutError::InvalidMethod {
          kind: MethodKind::Payment,
          code: code.to_string(),
        });
      }
    }

    let now = Utc::now();
    self.customer = Some(customer);
    if let Some(notes) = request.notes.filter(|n| !n.trim().is_empty()) {
      self.notes = Some(notes);
    }
    self.state = CheckoutState::Completed;
    self.completed_at = Some(now);
    self.updated_at = now;
    Ok(self.state)
  }

  // --- Internals ---

  fn ensure_mutable(&self) -> CheckoutResult<()> {
    if self.is_completed() {
      return Err(CheckoutError::AlreadyCompleted {
        token: self.token.to_string(),
      });
    }
    Ok(())
  }

  fn ensure_reached(&self, required: CheckoutState, action: &'static str) -> CheckoutResult<()> {
    if self.state < required {
      return Err(CheckoutError::InvalidState {
        action,
        actual: self.state,
      });
    }
    Ok(())
  }

  /// Keeps the single payment in sync with the order total.
  fn recalculate(&mut self) {
    if self.items.is_empty() {
      self.payments.clear();
    } else if self.payments.is_empty() {
      self.payments.push(Payment {
        id: PaymentId(0),
        amount: 0,
        currency: self.currency.clone(),
        method: None,
      });
    }
    let total = self.total();
    for payment in &mut self.payments {
      payment.amount = total;
    }
    self.touch();
  }

  fn touch(&mut self) {
    self.updated_at = Utc::now();
  }
}
