// shop_api/src/pipelines/register_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::common_steps;
use crate::pipelines::contexts::{RegisterCtxData, SendWelcomeEmailCtxData};
use crate::services::auth_service;
use checkout_core::validation::{self, messages};
use checkout_core::{ContextData, Pipeline, PipelineControl, Violations};
use tracing::{event, info, warn, Level};

/// Builds the customer registration pipeline behind `POST /{channel}/register`.
pub fn build_register_pipeline() -> Pipeline<RegisterCtxData, AppError> {
  let mut p = Pipeline::<RegisterCtxData, AppError>::new(&[
    ("resolve_channel", false, None),
    ("validate_registration_input", false, None),
    ("check_existing_customer", false, None),
    ("create_customer", false, None),
    ("send_welcome_email", true, None),
  ]);

  p.on_root("resolve_channel", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      guard.app_state.checkout.resolve_channel(&guard.channel_code)?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step: collect every field problem before rejecting.
  p.on_root("validate_registration_input", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let parsed = {
        let guard = ctx_data.read();
        event!(Level::DEBUG, email = %guard.email, "Validating registration input.");

        let mut violations = Violations::new();
        validation::not_blank(&mut violations, "email", &guard.email, messages::EMAIL_NOT_BLANK);
        let email = validation::optional_email(&mut violations, "email", Some(guard.email.as_str()));
        validation::not_blank(&mut violations, "password", &guard.password, messages::PASSWORD_NOT_BLANK);
        if !guard.password.trim().is_empty() && guard.password.len() < auth_service::MIN_PASSWORD_LENGTH {
          violations.add("password", messages::PASSWORD_TOO_SHORT);
        }
        violations.into_result()?;
        email
      };

      let email = parsed.ok_or_else(|| AppError::Internal("Email passed validation but did not parse.".to_string()))?;
      ctx_data.write().parsed_email = Some(email);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("check_existing_customer", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let email = guard
        .parsed_email
        .as_ref()
        .ok_or_else(|| AppError::Internal("Parsed email missing before the existence check.".to_string()))?;
      if guard.app_state.customers.exists(email) {
        warn!(%email, "Attempt to register an existing email.");
        return Err(AppError::Conflict("An account with this email already exists.".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  // Hashes the password and stores the account.
  p.on_root("create_customer", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let (customers, email, password, first_name, last_name) = {
        let guard = ctx_data.read();
        (
          guard.app_state.customers.clone(),
          guard.parsed_email.clone(),
          guard.password.clone(),
          guard.first_name.clone(),
          guard.last_name.clone(),
        )
      };
      let email = email.ok_or_else(|| AppError::Internal("Parsed email missing before account creation.".to_string()))?;

      let password_hash = auth_service::hash_password(&password).map_err(|e| {
        event!(Level::ERROR, error = %e, "Password hashing failed during registration.");
        e
      })?;
      let account = customers.register(email, password_hash, first_name, last_name)?;
      ctx_data.write().created_customer_id = Some(account.id);
      info!(customer_id = %account.id, "Customer account created.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("send_welcome_email", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let email_ctx = {
        let guard = ctx_data.read();
        if guard.created_customer_id.is_none() {
          warn!(email = %guard.email, "No account was created, skipping welcome email.");
          return Ok::<_, AppError>(PipelineControl::Continue);
        }
        let channel_name = guard
          .app_state
          .checkout
          .resolve_channel(&guard.channel_code)
          .map(|c| c.name)
          .unwrap_or_else(|_| guard.channel_code.clone());
        let recipient_name = guard
          .first_name
          .clone()
          .unwrap_or_else(|| guard.email.split('@').next().unwrap_or("customer").to_string());
        SendWelcomeEmailCtxData {
          app_state: guard.app_state.clone(),
          recipient_email: guard.email.clone(),
          recipient_name,
          channel_name,
        }
      };

      // Optional step: a mail failure must not undo the registration.
      let sent = common_steps::send_welcome_email_step(ContextData::new(email_ctx)).await.is_ok();
      ctx_data.write().welcome_email_sent = sent;
      Ok(PipelineControl::Continue)
    })
  });

  p
}
