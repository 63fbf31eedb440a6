// shop_api/src/pipelines/contexts.rs

//! Data carried through the application pipelines.
//! Handlers receive these wrapped in `checkout_core::ContextData`.

use crate::state::AppState;
use checkout_core::{Channel, CheckoutState, CompletionRequest, CustomerId, Email, Order, OrderToken, Principal};

#[derive(Clone)]
pub struct CompleteCheckoutCtxData {
  pub app_state: AppState,
  pub channel_code: String,
  pub token: OrderToken,
  pub principal: Principal,
  pub request: CompletionRequest,
  pub channel: Option<Channel>,
  pub order: Option<Order>,
  pub completed_state: Option<CheckoutState>,
  pub confirmation_email_sent: bool,
}

impl CompleteCheckoutCtxData {
  pub fn new(
    app_state: AppState,
    channel_code: impl Into<String>,
    token: OrderToken,
    principal: Principal,
    request: CompletionRequest,
  ) -> Self {
    Self {
      app_state,
      channel_code: channel_code.into(),
      token,
      principal,
      request,
      channel: None,
      order: None,
      completed_state: None,
      confirmation_email_sent: false,
    }
  }
}

#[derive(Clone)]
pub struct RegisterCtxData {
  pub app_state: AppState,
  pub channel_code: String,
  pub email: String,
  pub password: String,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub parsed_email: Option<Email>,
  pub created_customer_id: Option<CustomerId>,
  pub welcome_email_sent: bool,
}

#[derive(Clone)]
pub struct LoginCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub parsed_email: Option<Email>,
  pub customer_id: Option<CustomerId>,
  pub temp_password_hash: Option<String>,
  pub session_token: Option<String>,
}

#[derive(Clone)]
pub struct SendWelcomeEmailCtxData {
  pub app_state: AppState,
  pub recipient_email: String,
  pub recipient_name: String,
  pub channel_name: String,
}

#[derive(Clone)]
pub struct SendOrderConfirmationEmailCtxData {
  pub app_state: AppState,
  pub recipient_email: String,
  pub order_token: OrderToken,
  pub order_total_display: String,
  pub email_message_id: Option<String>,
}
