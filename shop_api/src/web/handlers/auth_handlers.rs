// shop_api/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use checkout_core::{ContextData, PipelineResult};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{LoginCtxData, RegisterCtxData};
use crate::state::AppState;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestPayload {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

// --- Handler Implementations ---

#[instrument(
  name = "handler::register",
  skip(app_state, path, req_payload),
  fields(req_email = %req_payload.email)
)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(RegisterCtxData {
    app_state: app_state.get_ref().clone(),
    channel_code: path.into_inner(),
    email: payload.email,
    password: payload.password,
    first_name: payload.first_name,
    last_name: payload.last_name,
    parsed_email: None,
    created_customer_id: None,
    welcome_email_sent: false,
  });

  match app_state.pipelines.register.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let guard = ctx_data.read();
      let customer_id = guard.created_customer_id.ok_or_else(|| {
        warn!("Registration pipeline completed without creating an account.");
        AppError::Internal("Registration completed, but the account is unavailable.".to_string())
      })?;
      info!(%customer_id, welcome_email_sent = guard.welcome_email_sent, "Customer registered.");
      Ok(HttpResponse::Created().json(json!({
        "customerId": customer_id,
        "email": guard.parsed_email.as_ref().map(|e| e.to_string()),
      })))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

#[instrument(
  name = "handler::login",
  skip(app_state, req_payload),
  fields(req_email = %req_payload.email)
)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(LoginCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    password: payload.password,
    parsed_email: None,
    customer_id: None,
    temp_password_hash: None,
    session_token: None,
  });

  match app_state.pipelines.login.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let token = ctx_data
        .read()
        .session_token
        .clone()
        .ok_or_else(|| AppError::Internal("Login completed, but no session was issued.".to_string()))?;
      Ok(HttpResponse::Ok().json(json!({ "token": token })))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}
