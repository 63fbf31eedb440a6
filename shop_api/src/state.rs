// shop_api/src/state.rs

use crate::config::AppConfig;
use crate::pipelines::Pipelines;
use crate::services::customers::CustomerDirectory;
use crate::services::email_mock::MockMailer;
use crate::services::sessions::SessionStore;
use checkout_core::CheckoutService;
use std::sync::Arc;

/// Shared by every request handler and carried into pipeline contexts.
#[derive(Clone)]
pub struct AppState {
  pub checkout: Arc<CheckoutService>,
  pub customers: Arc<CustomerDirectory>,
  pub sessions: Arc<SessionStore>,
  pub mailer: Arc<MockMailer>,
  pub pipelines: Arc<Pipelines>,
  pub config: Arc<AppConfig>,
}
