// shop_api/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use checkout_core::validation::{self, messages};
use checkout_core::{
  Address, CheckoutCommand, CompletionRequest, ContextData, OrderToken, PaymentId, PipelineResult, ShipmentId,
  Violations,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::CompleteCheckoutCtxData;
use crate::state::AppState;
use crate::web::extractors::Shopper;
use crate::web::views::OrderView;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequestPayload {
  #[serde(default)]
  pub billing_address: Option<Address>,
  pub shipping_address: Address,
}

#[derive(Deserialize, Debug)]
pub struct ChooseMethodRequestPayload {
  #[serde(default)]
  pub method: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct CompleteRequestPayload {
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub notes: Option<String>,
}

// --- Handler Implementations ---

#[instrument(name = "handler::get_checkout", skip(app_state, path))]
pub async fn get_checkout_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
  let (channel, token) = path.into_inner();
  let order = app_state.checkout.summary(&channel, &OrderToken::new(token)).await?;
  Ok(HttpResponse::Ok().json(OrderView::from(order)))
}

#[instrument(name = "handler::address_order", skip(app_state, shopper, path, req_payload))]
pub async fn address_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
  req_payload: web::Json<AddressRequestPayload>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let (channel, token) = path.into_inner();
  let payload = req_payload.into_inner();

  let mut violations = Violations::new();
  validation::address_fields(&mut violations, "shippingAddress", &payload.shipping_address);
  if let Some(billing) = &payload.billing_address {
    validation::address_fields(&mut violations, "billingAddress", billing);
  }
  violations.into_result()?;

  app_state
    .checkout
    .handle(
      &channel,
      shopper.principal(),
      CheckoutCommand::AddressOrder {
        token: OrderToken::new(token),
        billing: payload.billing_address,
        shipping: payload.shipping_address,
      },
    )
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::shipping_methods", skip(app_state, path))]
pub async fn shipping_methods_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
  let (channel, token) = path.into_inner();
  let options = app_state
    .checkout
    .available_shipping_methods(&channel, &OrderToken::new(token))
    .await?;
  Ok(HttpResponse::Ok().json(options))
}

#[instrument(
  name = "handler::choose_shipping_method",
  skip(app_state, shopper, path, req_payload),
  fields(method = %req_payload.method)
)]
pub async fn choose_shipping_method_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String, u32)>,
  req_payload: web::Json<ChooseMethodRequestPayload>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let (channel, token, shipment_id) = path.into_inner();
  let method = req_payload.into_inner().method;

  let mut violations = Violations::new();
  validation::not_blank(&mut violations, "method", &method, messages::METHOD_NOT_BLANK);
  violations.into_result()?;

  app_state
    .checkout
    .handle(
      &channel,
      shopper.principal(),
      CheckoutCommand::ChooseShippingMethod {
        token: OrderToken::new(token),
        shipment_id: ShipmentId(shipment_id),
        method,
      },
    )
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::payment_methods", skip(app_state, path))]
pub async fn payment_methods_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
  let (channel, token) = path.into_inner();
  let options = app_state
    .checkout
    .available_payment_methods(&channel, &OrderToken::new(token))
    .await?;
  Ok(HttpResponse::Ok().json(options))
}

/// Field and eligibility checks happen inside the service, so an ineligible method
/// comes back as a 400 violation list and leaves the order untouched.
#[instrument(
  name = "handler::choose_payment_method",
  skip(app_state, shopper, path, req_payload),
  fields(method = %req_payload.method)
)]
pub async fn choose_payment_method_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String, u32)>,
  req_payload: web::Json<ChooseMethodRequestPayload>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let (channel, token, payment_id) = path.into_inner();
  app_state
    .checkout
    .handle(
      &channel,
      shopper.principal(),
      CheckoutCommand::ChoosePaymentMethod {
        token: OrderToken::new(token),
        payment_id: PaymentId(payment_id),
        method: req_payload.into_inner().method,
      },
    )
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

/// An empty body means "no payload". Anything else must be a valid completion payload.
fn parse_completion_payload(body: &[u8]) -> Result<CompleteRequestPayload, AppError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(CompleteRequestPayload::default());
  }
  serde_json::from_slice(body).map_err(|e| {
    warn!(error = %e, "Malformed checkout completion payload.");
    AppError::Validation(format!("Malformed completion payload: {e}"))
  })
}

/// `PUT /{channel}/checkout/{token}/complete`. The body is optional.
///
/// The channel is checked before the body, so an unknown channel is always a 404.
#[instrument(name = "handler::complete_checkout", skip(app_state, shopper, path, body))]
pub async fn complete_checkout_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
  body: web::Bytes,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let (channel, token) = path.into_inner();
  app_state.checkout.resolve_channel(&channel)?;
  let payload = parse_completion_payload(&body)?;

  let mut violations = Violations::new();
  let email = validation::optional_email(&mut violations, "email", payload.email.as_deref());
  violations.into_result()?;

  let request = CompletionRequest {
    email,
    notes: payload.notes.filter(|n| !n.trim().is_empty()),
  };
  let ctx_data = ContextData::new(CompleteCheckoutCtxData::new(
    app_state.get_ref().clone(),
    channel,
    OrderToken::new(token),
    shopper.0,
    request,
  ));

  match app_state.pipelines.complete_checkout.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let guard = ctx_data.read();
      info!(
        token = %guard.token,
        state = ?guard.completed_state,
        confirmation_email_sent = guard.confirmation_email_sent,
        "Checkout completion request finished."
      );
      Ok(HttpResponse::NoContent().finish())
    }
    PipelineResult::Stopped => {
      warn!("Checkout completion pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
  }
}
