// shop_api/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use checkout_core::validation::{self, messages};
use checkout_core::{CheckoutCommand, OrderToken, Violations};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::{AppError, Result as AppResult};
use crate::state::AppState;
use crate::web::extractors::Shopper;
use crate::web::views::OrderView;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequestPayload {
  #[serde(default)]
  pub product_code: String,
  pub quantity: i64,
}

#[derive(Deserialize, Debug)]
pub struct ChangeQuantityRequestPayload {
  pub quantity: i64,
}

/// Rejects non-positive quantities with a field violation instead of a deserialization error.
fn positive_quantity(violations: &mut Violations, quantity: i64) -> u32 {
  match u32::try_from(quantity) {
    Ok(q) if q > 0 => q,
    _ => {
      violations.add("quantity", messages::QUANTITY_NOT_POSITIVE);
      0
    }
  }
}

async fn render_summary(app_state: &AppState, channel: &str, token: &OrderToken) -> AppResult<OrderView> {
  let order = app_state.checkout.summary(channel, token).await?;
  Ok(OrderView::from(order))
}

#[instrument(name = "handler::pickup_cart", skip(app_state, shopper, path))]
pub async fn pickup_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let (channel, token) = path.into_inner();
  let outcome = app_state
    .checkout
    .handle(
      &channel,
      shopper.principal(),
      CheckoutCommand::PickupCart {
        token: Some(OrderToken::new(token)),
      },
    )
    .await?;
  info!(token = %outcome.token, %channel, "Cart picked up.");
  let view = render_summary(&app_state, &channel, &outcome.token).await?;
  Ok(HttpResponse::Created().json(view))
}

#[instrument(name = "handler::get_cart", skip(app_state, path))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
  let (channel, token) = path.into_inner();
  let view = render_summary(&app_state, &channel, &OrderToken::new(token)).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(
  name = "handler::add_item",
  skip(app_state, shopper, path, req_payload),
  fields(product_code = %req_payload.product_code, quantity = req_payload.quantity)
)]
pub async fn add_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
  req_payload: web::Json<AddItemRequestPayload>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let (channel, token) = path.into_inner();
  let payload = req_payload.into_inner();

  let mut violations = Violations::new();
  validation::not_blank(
    &mut violations,
    "productCode",
    &payload.product_code,
    messages::PRODUCT_CODE_NOT_BLANK,
  );
  let quantity = positive_quantity(&mut violations, payload.quantity);
  violations.into_result()?;

  let token = OrderToken::new(token);
  app_state
    .checkout
    .handle(
      &channel,
      shopper.principal(),
      CheckoutCommand::PutItemToCart {
        token: token.clone(),
        product_code: payload.product_code,
        quantity,
      },
    )
    .await?;
  let view = render_summary(&app_state, &channel, &token).await?;
  Ok(HttpResponse::Created().json(view))
}

#[instrument(name = "handler::change_item_quantity", skip(app_state, shopper, path, req_payload))]
pub async fn change_item_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String, String)>,
  req_payload: web::Json<ChangeQuantityRequestPayload>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let (channel, token, product_code) = path.into_inner();

  let mut violations = Violations::new();
  let quantity = positive_quantity(&mut violations, req_payload.quantity);
  violations.into_result()?;

  let token = OrderToken::new(token);
  app_state
    .checkout
    .handle(
      &channel,
      shopper.principal(),
      CheckoutCommand::ChangeItemQuantity {
        token: token.clone(),
        product_code,
        quantity,
      },
    )
    .await?;
  let view = render_summary(&app_state, &channel, &token).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::remove_item", skip(app_state, shopper, path))]
pub async fn remove_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String, String)>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let (channel, token, product_code) = path.into_inner();
  let token = OrderToken::new(token);
  app_state
    .checkout
    .handle(
      &channel,
      shopper.principal(),
      CheckoutCommand::RemoveItemFromCart {
        token: token.clone(),
        product_code,
      },
    )
    .await?;
  let view = render_summary(&app_state, &channel, &token).await?;
  Ok(HttpResponse::Ok().json(view))
}
