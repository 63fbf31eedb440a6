// shop_api/src/pipelines/login_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::LoginCtxData;
use crate::services::auth_service;
use checkout_core::{ContextData, Email, Pipeline, PipelineControl};
use tracing::{event, warn, Level};

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Builds the login pipeline behind `POST /login`. A successful run leaves a bearer
/// token in `session_token`.
pub fn build_login_pipeline() -> Pipeline<LoginCtxData, AppError> {
  let mut p = Pipeline::<LoginCtxData, AppError>::new(&[
    ("validate_login_input", false, None),
    ("fetch_customer_by_email", false, None),
    ("verify_customer_password", false, None),
    ("issue_session_token", false, None),
  ]);

  p.on_root("validate_login_input", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (email_val, password_is_empty) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.password.is_empty())
      };

      event!(Level::DEBUG, email = %email_val, "Validating login input.");
      let email = Email::parse(&email_val).map_err(|_| {
        warn!("Invalid email format provided for login.");
        AppError::Validation("Valid email is required.".to_string())
      })?;
      if password_is_empty {
        warn!("Empty password provided for login.");
        return Err(AppError::Validation("Password is required.".to_string()));
      }
      ctx_data.write().parsed_email = Some(email);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("fetch_customer_by_email", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let email = guard
        .parsed_email
        .clone()
        .ok_or_else(|| AppError::Internal("Parsed email missing before lookup.".to_string()))?;

      let found = guard.app_state.customers.find(&email);
      match found {
        Some(account) => {
          event!(Level::INFO, customer_id = %account.id, "Customer found for login.");
          guard.customer_id = Some(account.id);
          guard.temp_password_hash = Some(account.password_hash);
          Ok::<_, AppError>(PipelineControl::Continue)
        }
        None => {
          warn!(%email, "No customer account for login email.");
          Err(AppError::Auth(INVALID_CREDENTIALS.to_string()))
        }
      }
    })
  });

  p.on_root("verify_customer_password", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      // The hash is only needed for this step.
      let stored_hash = guard
        .temp_password_hash
        .take()
        .ok_or_else(|| AppError::Internal("Password hash unexpectedly missing for verification.".to_string()))?;

      if auth_service::verify_password(&stored_hash, &guard.password)? {
        event!(Level::DEBUG, customer_id = ?guard.customer_id, "Password verified.");
        Ok::<_, AppError>(PipelineControl::Continue)
      } else {
        warn!(customer_id = ?guard.customer_id, "Password mismatch on login.");
        Err(AppError::Auth(INVALID_CREDENTIALS.to_string()))
      }
    })
  });

  p.on_root("issue_session_token", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let (customer_id, email) = match (guard.customer_id, guard.parsed_email.clone()) {
        (Some(id), Some(email)) => (id, email),
        _ => return Err(AppError::Internal("Customer missing when issuing a session.".to_string())),
      };
      let token = guard.app_state.sessions.issue(customer_id, email);
      guard.session_token = Some(token);
      event!(Level::INFO, %customer_id, "Session token issued.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}
