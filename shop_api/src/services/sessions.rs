// shop_api/src/services/sessions.rs

//! Opaque bearer tokens issued at login.

use checkout_core::{CustomerId, Email, Principal};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct Session {
  customer_id: CustomerId,
  email: Email,
}

#[derive(Debug, Default)]
pub struct SessionStore {
  sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn issue(&self, customer_id: CustomerId, email: Email) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    self
      .sessions
      .write()
      .insert(token.clone(), Session { customer_id, email });
    debug!(%customer_id, "Session issued.");
    token
  }

  /// The principal behind `token`, or `None` when the token is unknown.
  pub fn resolve(&self, token: &str) -> Option<Principal> {
    self.sessions.read().get(token).map(|session| Principal::Customer {
      id: session.customer_id,
      email: session.email.clone(),
    })
  }
}
