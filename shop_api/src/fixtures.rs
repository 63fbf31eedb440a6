// shop_api/src/fixtures.rs

//! The store definition: channels, catalog, methods and seed customers.

use crate::errors::{AppError, Result};
use crate::services::auth_service;
use crate::services::customers::CustomerDirectory;
use checkout_core::{Channel, Email, PaymentMethod, Product, ShippingMethod};
use serde::Deserialize;
use tracing::{info, instrument};

const DEFAULT_STORE: &str = include_str!("../fixtures/store.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCustomer {
  pub email: Email,
  pub password: String,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreFixture {
  pub channels: Vec<Channel>,
  pub products: Vec<Product>,
  pub shipping_methods: Vec<ShippingMethod>,
  pub payment_methods: Vec<PaymentMethod>,
  #[serde(default)]
  pub customers: Vec<SeedCustomer>,
}

impl StoreFixture {
  /// The built-in demo store.
  pub fn builtin() -> Result<Self> {
    Self::parse(DEFAULT_STORE)
  }

  pub fn parse(raw: &str) -> Result<Self> {
    serde_json::from_str(raw).map_err(|e| AppError::Config(format!("Invalid store fixture: {}", e)))
  }

  /// Reads `path` when given, the built-in store otherwise.
  #[instrument(name = "fixtures::load")]
  pub async fn load(path: Option<&str>) -> Result<Self> {
    let fixture = match path {
      Some(path) => {
        let raw = tokio::fs::read_to_string(path)
          .await
          .map_err(|e| AppError::Config(format!("Cannot read store fixture '{}': {}", path, e)))?;
        Self::parse(&raw)?
      }
      None => Self::builtin()?,
    };
    info!(
      channels = fixture.channels.len(),
      products = fixture.products.len(),
      customers = fixture.customers.len(),
      "Store fixture loaded."
    );
    Ok(fixture)
  }

  /// Registers the seed customers, hashing their plain passwords.
  pub fn seed_customers(&self, directory: &CustomerDirectory) -> Result<()> {
    for seed in &self.customers {
      let password_hash = auth_service::hash_password(&seed.password)?;
      directory.register(
        seed.email.clone(),
        password_hash,
        seed.first_name.clone(),
        seed.last_name.clone(),
      )?;
    }
    Ok(())
  }
}
