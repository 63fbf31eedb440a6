// shop_api/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use checkout_core::{CheckoutError, ErrorKind};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Checkout(#[from] CheckoutError),

  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),

  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

/// Machine-readable error code and human message for a checkout failure.
fn describe(err: &CheckoutError) -> (&'static str, String) {
  match err {
    CheckoutError::ChannelNotFound { .. } => ("channel_has_not_been_found", "Channel has not been found.".to_string()),
    CheckoutError::OrderNotFound { .. } => ("cart_has_not_been_found", "Cart has not been found.".to_string()),
    CheckoutError::PaymentNotFound { .. } => ("payment_has_not_been_found", "Payment has not been found.".to_string()),
    CheckoutError::ShipmentNotFound { .. } => ("shipment_has_not_been_found", "Shipment has not been found.".to_string()),
    CheckoutError::ProductNotFound { .. } => ("product_has_not_been_found", "Product has not been found.".to_string()),
    CheckoutError::ItemNotFound { .. } => ("cart_item_has_not_been_found", "Cart item has not been found.".to_string()),
    CheckoutError::InvalidMethod { .. } => ("method_is_not_available", err.to_string()),
    CheckoutError::InvalidQuantity { .. } => ("invalid_quantity", err.to_string()),
    CheckoutError::EmailRequired => ("email_is_required", err.to_string()),
    CheckoutError::InvalidEmail(_) => ("invalid_email", err.to_string()),
    CheckoutError::Validation(_) => ("validation_failed", "Validation failed".to_string()),
    CheckoutError::Unauthorized(_) => ("unauthorized", err.to_string()),
    CheckoutError::InvalidState { .. } => ("invalid_checkout_state", err.to_string()),
    CheckoutError::AlreadyCompleted { .. } => ("checkout_already_completed", err.to_string()),
    CheckoutError::EmptyCart { .. } => ("cart_is_empty", err.to_string()),
    CheckoutError::CartAlreadyExists { .. } => ("cart_already_exists", err.to_string()),
    CheckoutError::HandlerMissing { .. } | CheckoutError::Storage { .. } | CheckoutError::Internal(_) => {
      ("internal_error", "An internal error occurred.".to_string())
    }
  }
}

fn body(status: StatusCode, error: &str, message: &str) -> HttpResponse {
  HttpResponse::build(status).json(json!({
    "code": status.as_u16(),
    "error": error,
    "message": message,
  }))
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Checkout(err) => match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::InvalidState => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Conflict(_) | AppError::PipelineHaltedByHandler => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::info!(application_error = %self, status = status.as_u16(), "Request rejected");
    }

    match self {
      AppError::Checkout(CheckoutError::Validation(violations)) => HttpResponse::BadRequest().json(json!({
        "code": 400,
        "message": "Validation failed",
        "errors": violations.by_property(),
      })),
      AppError::Checkout(err) => {
        let (code, message) = describe(err);
        body(status, code, &message)
      }
      AppError::Validation(m) => body(status, "validation_failed", m),
      AppError::Auth(m) => body(status, "unauthorized", m),
      AppError::Conflict(m) => body(status, "conflict", m),
      AppError::Config(_) => body(status, "configuration_error", "Configuration issue"),
      AppError::Sqlx(_) => body(status, "database_error", "Database operation failed"),
      AppError::Internal(_) => body(status, "internal_error", "An internal error occurred."),
      AppError::PipelineHaltedByHandler => body(status, "halted", "Process halted by business logic."),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
