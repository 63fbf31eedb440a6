// shop_api/src/pipelines/complete_checkout_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::{CompleteCheckoutCtxData, SendOrderConfirmationEmailCtxData};
use checkout_core::{ContextData, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{event, info, warn, Level};

pub const RESOLVE_CHANNEL: &str = "resolve_channel";
pub const LOAD_ORDER: &str = "load_order";
pub const COMPLETE_ORDER: &str = "complete_order";
pub const SAVE_ORDER: &str = "save_order";
pub const SEND_CONFIRMATION_EMAIL: &str = "send_confirmation_email";

/// Builds the pipeline behind `PUT /{channel}/checkout/{token}/complete`.
///
/// The channel is resolved before the order is touched, so an unknown channel is
/// reported as such whatever state the order is in. The order is only saved once the
/// transition succeeded; the confirmation email runs afterwards and never fails the
/// request.
pub fn build_complete_checkout_pipeline() -> Pipeline<CompleteCheckoutCtxData, AppError> {
  let emails_disabled: SkipCondition<CompleteCheckoutCtxData> =
    Arc::new(|ctx_data: ContextData<CompleteCheckoutCtxData>| !ctx_data.read().app_state.config.send_confirmation_emails);

  let mut p = Pipeline::<CompleteCheckoutCtxData, AppError>::new(&[
    (RESOLVE_CHANNEL, false, None),
    (LOAD_ORDER, false, None),
    (COMPLETE_ORDER, false, None),
    (SAVE_ORDER, false, None),
    (SEND_CONFIRMATION_EMAIL, true, Some(emails_disabled)),
  ]);

  p.on_root(RESOLVE_CHANNEL, |ctx_data: ContextData<CompleteCheckoutCtxData>| {
    Box::pin(async move {
      let channel = {
        let guard = ctx_data.read();
        guard.app_state.checkout.resolve_channel(&guard.channel_code)
      };
      let channel = channel.map_err(|e| {
        event!(Level::INFO, error = %e, "Checkout completion requested through an unknown channel.");
        AppError::from(e)
      })?;
      ctx_data.write().channel = Some(channel);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root(LOAD_ORDER, |ctx_data: ContextData<CompleteCheckoutCtxData>| {
    Box::pin(async move {
      let (checkout, channel, token) = {
        let guard = ctx_data.read();
        (guard.app_state.checkout.clone(), guard.channel.clone(), guard.token.clone())
      };
      let channel = channel.ok_or_else(|| AppError::Internal("Channel missing before loading the order.".to_string()))?;

      let order = checkout.load_order(&channel, &token).await?;
      event!(Level::DEBUG, %token, state = %order.state, "Order loaded for completion.");
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root(COMPLETE_ORDER, |ctx_data: ContextData<CompleteCheckoutCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let mut order = guard
        .order
        .take()
        .ok_or_else(|| AppError::Internal("Order missing before completion.".to_string()))?;
      let state = guard
        .app_state
        .checkout
        .complete_order(&mut order, guard.request.clone(), &guard.principal)?;
      guard.order = Some(order);
      guard.completed_state = Some(state);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root(SAVE_ORDER, |ctx_data: ContextData<CompleteCheckoutCtxData>| {
    Box::pin(async move {
      let (checkout, order) = {
        let guard = ctx_data.read();
        (guard.app_state.checkout.clone(), guard.order.clone())
      };
      let order = order.ok_or_else(|| AppError::Internal("Completed order missing before save.".to_string()))?;
      checkout.save(&order).await?;
      info!(token = %order.token, "Completed order saved.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root(SEND_CONFIRMATION_EMAIL, |ctx_data: ContextData<CompleteCheckoutCtxData>| {
    Box::pin(async move {
      let email_ctx = {
        let guard = ctx_data.read();
        let Some(order) = guard.order.as_ref() else {
          return Ok::<_, AppError>(PipelineControl::Continue);
        };
        let Some(customer) = order.customer.as_ref() else {
          warn!(token = %order.token, "Completed order has no customer, skipping confirmation email.");
          return Ok(PipelineControl::Continue);
        };
        SendOrderConfirmationEmailCtxData {
          app_state: guard.app_state.clone(),
          recipient_email: customer.email.to_string(),
          order_token: order.token.clone(),
          order_total_display: common_steps::format_amount(order.total(), &order.currency),
          email_message_id: None,
        }
      };

      let sent = send_confirmation(email_ctx).await;
      ctx_data.write().confirmation_email_sent = sent;
      Ok(PipelineControl::Continue)
    })
  });

  p
}

/// Sends the confirmation, logging instead of failing. Returns whether it went out.
async fn send_confirmation(email_ctx: SendOrderConfirmationEmailCtxData) -> bool {
  let token = email_ctx.order_token.clone();
  let result: AppResult<PipelineControl> =
    common_steps::send_order_confirmation_email_step(ContextData::new(email_ctx)).await;
  match result {
    Ok(_) => true,
    Err(e) => {
      warn!(%token, error = %e, "Order confirmation email failed; checkout stays completed.");
      false
    }
  }
}
