// checkout_core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::authorization::DenyReason;
use crate::model::customer::EmailError;
use crate::model::order::CheckoutState;
use crate::validation::Violations;

/// Which kind of method a shopper tried to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
  Shipping,
  Payment,
}

impl std::fmt::Display for MethodKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      MethodKind::Shipping => f.write_str("shipping"),
      MethodKind::Payment => f.write_str("payment"),
    }
  }
}

/// Coarse classification of a [`CheckoutError`], used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Validation,
  Unauthorized,
  InvalidState,
  Internal,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
  #[error("Channel not found: {channel}")]
  ChannelNotFound { channel: String },

  #[error("Order not found for token: {token}")]
  OrderNotFound { token: String },

  #[error("Payment {payment_id} not found in order {token}")]
  PaymentNotFound { token: String, payment_id: u32 },

  #[error("Shipment {shipment_id} not found in order {token}")]
  ShipmentNotFound { token: String, shipment_id: u32 },

  #[error("Product not found: {code}")]
  ProductNotFound { code: String },

  #[error("Cart has no item for product: {product_code}")]
  ItemNotFound { product_code: String },

  #[error("The {kind} method '{code}' is not available for this order")]
  InvalidMethod { kind: MethodKind, code: String },

  #[error("Quantity must be greater than zero, got {quantity}")]
  InvalidQuantity { quantity: u32 },

  #[error("An email address is required to complete checkout")]
  EmailRequired,

  #[error("Invalid email: {0}")]
  InvalidEmail(#[from] EmailError),

  #[error("Validation failed: {0}")]
  Validation(Violations),

  #[error("Not allowed to complete this checkout: {0}")]
  Unauthorized(DenyReason),

  #[error("Cannot {action} while the order is in state '{actual}'")]
  InvalidState { action: &'static str, actual: CheckoutState },

  #[error("Order {token} is already completed")]
  AlreadyCompleted { token: String },

  #[error("Order {token} has no items")]
  EmptyCart { token: String },

  #[error("A cart with token {token} already exists")]
  CartAlreadyExists { token: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Storage operation failed. Source: {source}")]
  Storage {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal checkout error: {0}")]
  Internal(String),
}

impl CheckoutError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      CheckoutError::ChannelNotFound { .. }
      | CheckoutError::OrderNotFound { .. }
      | CheckoutError::PaymentNotFound { .. }
      | CheckoutError::ShipmentNotFound { .. }
      | CheckoutError::ProductNotFound { .. }
      | CheckoutError::ItemNotFound { .. } => ErrorKind::NotFound,
      CheckoutError::InvalidMethod { .. }
      | CheckoutError::InvalidQuantity { .. }
      | CheckoutError::EmailRequired
      | CheckoutError::InvalidEmail(_)
      | CheckoutError::Validation(_) => ErrorKind::Validation,
      CheckoutError::Unauthorized(_) => ErrorKind::Unauthorized,
      CheckoutError::InvalidState { .. }
      | CheckoutError::AlreadyCompleted { .. }
      | CheckoutError::EmptyCart { .. }
      | CheckoutError::CartAlreadyExists { .. } => ErrorKind::InvalidState,
      CheckoutError::HandlerMissing { .. } | CheckoutError::Storage { .. } | CheckoutError::Internal(_) => {
        ErrorKind::Internal
      }
    }
  }
}

// Storage backends report through anyhow; anything reaching us that way is a storage failure.
impl From<AnyhowError> for CheckoutError {
  fn from(err: AnyhowError) -> Self {
    CheckoutError::Storage { source: err }
  }
}

pub type CheckoutResult<T, E = CheckoutError> = std::result::Result<T, E>;
