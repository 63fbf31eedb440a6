// shop_api/src/lib.rs

//! Shop-facing checkout API over `checkout_core`.

pub mod config;
pub mod db;
pub mod errors;
pub mod fixtures;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod web;

use checkout_core::{
  ChannelRegistry, CheckoutService, ConfiguredPaymentMethodsResolver, ConfiguredShippingMethodsResolver,
  InMemoryOrderRepository, OrderRepository, ProductCatalog,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::db::PgOrderRepository;
use crate::errors::Result;
use crate::fixtures::StoreFixture;
use crate::pipelines::Pipelines;
use crate::services::customers::CustomerDirectory;
use crate::services::email_mock::MockMailer;
use crate::services::sessions::SessionStore;
use crate::state::AppState;

pub use crate::web::configure_app_routes;

/// Loads the store and wires every collaborator into an `AppState`.
///
/// Orders live in Postgres when `database_url` is set, in memory otherwise.
#[instrument(name = "build_state", skip(config))]
pub async fn build_state(config: AppConfig) -> Result<AppState> {
  let fixture = StoreFixture::load(config.store_fixtures_path.as_deref()).await?;

  let orders: Arc<dyn OrderRepository> = match config.database_url.as_deref() {
    Some(url) => {
      let repository = PgOrderRepository::connect(url).await?;
      repository.ensure_schema().await?;
      Arc::new(repository)
    }
    None => {
      info!("No DATABASE_URL configured, keeping orders in memory.");
      Arc::new(InMemoryOrderRepository::new())
    }
  };

  build_state_with(config, fixture, orders)
}

/// Same as [`build_state`] with the store and order storage supplied by the caller.
pub fn build_state_with(config: AppConfig, fixture: StoreFixture, orders: Arc<dyn OrderRepository>) -> Result<AppState> {
  let customers = Arc::new(CustomerDirectory::new());
  fixture.seed_customers(&customers)?;

  let checkout = CheckoutService::new(
    Arc::new(ChannelRegistry::new(fixture.channels)),
    Arc::new(ProductCatalog::new(fixture.products)),
    orders,
    Arc::new(ConfiguredShippingMethodsResolver::new(fixture.shipping_methods)),
    Arc::new(ConfiguredPaymentMethodsResolver::new(fixture.payment_methods)),
    customers.clone(),
  );

  Ok(AppState {
    checkout: Arc::new(checkout),
    customers,
    sessions: Arc::new(SessionStore::new()),
    mailer: Arc::new(MockMailer::new(config.mail_sender.clone())),
    pipelines: Arc::new(Pipelines::build()),
    config: Arc::new(config),
  })
}
