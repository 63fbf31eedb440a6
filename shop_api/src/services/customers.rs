// shop_api/src/services/customers.rs

//! Registered customer accounts.

use crate::errors::{AppError, Result as AppResult};
use checkout_core::{CustomerId, CustomerProvider, CustomerRef, Email};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccount {
  pub id: CustomerId,
  pub email: Email,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Accounts keyed by their (normalised) email.
#[derive(Debug, Default)]
pub struct CustomerDirectory {
  accounts: RwLock<HashMap<Email, CustomerAccount>>,
}

impl CustomerDirectory {
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores a new account. Fails with a conflict when the email is taken.
  pub fn register(
    &self,
    email: Email,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
  ) -> AppResult<CustomerAccount> {
    let mut accounts = self.accounts.write();
    if accounts.contains_key(&email) {
      return Err(AppError::Conflict(format!("An account with email {} already exists.", email)));
    }
    let account = CustomerAccount {
      id: CustomerId::new(),
      email: email.clone(),
      password_hash,
      first_name,
      last_name,
      created_at: Utc::now(),
    };
    accounts.insert(email, account.clone());
    info!(customer_id = %account.id, email = %account.email, "Customer registered.");
    Ok(account)
  }

  pub fn find(&self, email: &Email) -> Option<CustomerAccount> {
    self.accounts.read().get(email).cloned()
  }

  pub fn exists(&self, email: &Email) -> bool {
    self.accounts.read().contains_key(email)
  }

  pub fn len(&self) -> usize {
    self.accounts.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.accounts.read().is_empty()
  }
}

impl CustomerProvider for CustomerDirectory {
  fn provide(&self, email: &Email) -> CustomerRef {
    match self.accounts.read().get(email) {
      Some(account) => CustomerRef::registered(account.email.clone(), account.id),
      None => CustomerRef::guest(email.clone()),
    }
  }
}
