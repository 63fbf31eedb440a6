// shop_api/src/pipelines/common_steps.rs

//! Steps shared by several pipelines. They run on their own small contexts so
//! callers only hand over what the step needs.

use crate::errors::Result as AppResult;
use crate::pipelines::contexts::{SendOrderConfirmationEmailCtxData, SendWelcomeEmailCtxData};
use checkout_core::{ContextData, PipelineControl};
use tracing::{info, instrument, warn};

/// Renders an amount in minor units, e.g. `10495` in GBP as `GBP 104.95`.
pub fn format_amount(amount: i64, currency: &str) -> String {
  let sign = if amount < 0 { "-" } else { "" };
  let abs = amount.unsigned_abs();
  format!("{} {}{}.{:02}", currency, sign, abs / 100, abs % 100)
}

#[instrument(name = "common_step::send_welcome_email", skip(ctx_data), err)]
pub async fn send_welcome_email_step(ctx_data: ContextData<SendWelcomeEmailCtxData>) -> AppResult<PipelineControl> {
  let (recipient_email, recipient_name, channel_name, mailer) = {
    let guard = ctx_data.read();
    (
      guard.recipient_email.clone(),
      guard.recipient_name.clone(),
      guard.channel_name.clone(),
      guard.app_state.mailer.clone(),
    )
  };

  let sent = mailer
    .send(
      &recipient_email,
      &format!("Welcome to {}, {}!", channel_name, recipient_name),
      &format!("<p>Hi {},</p><p>Your account is ready. Happy shopping!</p>", recipient_name),
    )
    .await
    .map_err(|e| {
      warn!(recipient = %recipient_email, error = %e, "Failed to send welcome email.");
      e
    })?;
  info!(recipient = %recipient_email, message_id = %sent.message_id, "Welcome email sent.");
  Ok(PipelineControl::Continue)
}

#[instrument(name = "common_step::send_order_confirmation", skip(ctx_data), err)]
pub async fn send_order_confirmation_email_step(
  ctx_data: ContextData<SendOrderConfirmationEmailCtxData>,
) -> AppResult<PipelineControl> {
  let (recipient_email, order_token, total_display, mailer) = {
    let guard = ctx_data.read();
    (
      guard.recipient_email.clone(),
      guard.order_token.clone(),
      guard.order_total_display.clone(),
      guard.app_state.mailer.clone(),
    )
  };

  let sent = mailer
    .send(
      &recipient_email,
      &format!("Your order {} is confirmed", order_token),
      &format!(
        "<p>Thank you for your order.</p><p>Order {} for {} has been placed.</p>",
        order_token, total_display
      ),
    )
    .await?;
  ctx_data.write().email_message_id = Some(sent.message_id.clone());
  info!(%order_token, message_id = %sent.message_id, "Order confirmation email sent.");
  Ok(PipelineControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::format_amount;

  #[test]
  fn formats_minor_units() {
    assert_eq!(format_amount(10495, "GBP"), "GBP 104.95");
    assert_eq!(format_amount(5, "USD"), "USD 0.05");
    assert_eq!(format_amount(-250, "EUR"), "EUR -2.50");
  }
}
