// checkout_core/src/validation.rs

//! Request-level validation: field violations are collected into a [`Violations`]
//! list instead of failing on the first problem.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{CheckoutError, CheckoutResult};
use crate::model::address::Address;
use crate::model::customer::Email;
use crate::model::order::{OrderToken, PaymentId};
use crate::repository::OrderRepository;
use crate::resolver::payment::PaymentMethodsResolver;

/// Message keys returned to clients. Translation happens on the client side.
pub mod messages {
  pub const PAYMENT_METHOD_NOT_VALID: &str = "shop_api.checkout.payment_method.not_valid";
  pub const TOKEN_NOT_BLANK: &str = "shop_api.checkout.token.not_blank";
  pub const METHOD_NOT_BLANK: &str = "shop_api.checkout.method.not_blank";
  pub const EMAIL_NOT_VALID: &str = "shop_api.checkout.email.not_valid";
  pub const EMAIL_NOT_BLANK: &str = "shop_api.customer.email.not_blank";
  pub const QUANTITY_NOT_POSITIVE: &str = "shop_api.cart.quantity.not_positive";
  pub const PRODUCT_CODE_NOT_BLANK: &str = "shop_api.cart.product_code.not_blank";
  pub const ADDRESS_FIELD_NOT_BLANK: &str = "shop_api.address.field.not_blank";
  pub const PASSWORD_NOT_BLANK: &str = "shop_api.customer.password.not_blank";
  pub const PASSWORD_TOO_SHORT: &str = "shop_api.customer.password.too_short";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
  pub property_path: String,
  pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, property_path: impl Into<String>, message: &str) {
    self.0.push(Violation {
      property_path: property_path.into(),
      message: message.to_string(),
    });
  }

  pub fn extend(&mut self, other: Violations) {
    self.0.extend(other.0);
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Violation> {
    self.0.iter()
  }

  /// Message keys grouped by property path, the shape clients receive.
  pub fn by_property(&self) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for violation in &self.0 {
      grouped
        .entry(violation.property_path.clone())
        .or_default()
        .push(violation.message.clone());
    }
    grouped
  }

  /// `Ok(())` when empty, otherwise the whole list as [`CheckoutError::Validation`].
  pub fn into_result(self) -> CheckoutResult<()> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(CheckoutError::Validation(self))
    }
  }
}

impl fmt::Display for Violations {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let rendered: Vec<String> = self
      .0
      .iter()
      .map(|v| format!("{}: {}", v.property_path, v.message))
      .collect();
    f.write_str(&rendered.join(", "))
  }
}

pub fn not_blank(violations: &mut Violations, property_path: &str, value: &str, message: &str) {
  if value.trim().is_empty() {
    violations.add(property_path, message);
  }
}

/// Parses an optional email field, recording a violation when it is present but malformed.
pub fn optional_email(violations: &mut Violations, property_path: &str, raw: Option<&str>) -> Option<Email> {
  let raw = raw.filter(|s| !s.trim().is_empty())?;
  match Email::parse(raw) {
    Ok(email) => Some(email),
    Err(e) => {
      debug!(error = %e, "Rejected email field.");
      violations.add(property_path, messages::EMAIL_NOT_VALID);
      None
    }
  }
}

pub fn address_fields(violations: &mut Violations, prefix: &str, address: &Address) {
  for field in address.blank_fields() {
    violations.add(format!("{prefix}.{field}"), messages::ADDRESS_FIELD_NOT_BLANK);
  }
}

/// A shopper's request to pay one payment of an order with a given method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoosePaymentMethodRequest {
  pub token: OrderToken,
  pub payment_id: PaymentId,
  pub method: String,
}

impl ChoosePaymentMethodRequest {
  pub fn validate_fields(&self) -> Violations {
    let mut violations = Violations::new();
    not_blank(&mut violations, "token", self.token.as_str(), messages::TOKEN_NOT_BLANK);
    not_blank(&mut violations, "method", &self.method, messages::METHOD_NOT_BLANK);
    violations
  }
}

/// Checks that the requested method is one the resolver offers for that payment.
pub struct PaymentMethodValidator {
  orders: Arc<dyn OrderRepository>,
  resolver: Arc<dyn PaymentMethodsResolver>,
}

impl PaymentMethodValidator {
  pub fn new(orders: Arc<dyn OrderRepository>, resolver: Arc<dyn PaymentMethodsResolver>) -> Self {
    Self { orders, resolver }
  }

  /// Returns the violations for `request`.
  ///
  /// An unknown order yields no violation: order existence is checked by the
  /// command itself. An unknown payment id is an error, not a violation.
  #[instrument(
    name = "PaymentMethodValidator::validate",
    skip(self, request),
    fields(token = %request.token, payment_id = %request.payment_id, method = %request.method)
  )]
  pub async fn validate(&self, request: &ChoosePaymentMethodRequest) -> CheckoutResult<Violations> {
    let mut violations = Violations::new();
    let Some(order) = self.orders.find_by_token(&request.token).await? else {
      debug!("Order not found, leaving existence check to the command.");
      return Ok(violations);
    };

    let payment = order.payment(request.payment_id)?;
    if !self.resolver.eligible_codes(&order, payment).contains(&request.method) {
      violations.add("method", messages::PAYMENT_METHOD_NOT_VALID);
    }
    Ok(violations)
  }
}
