// checkout_core/src/authorization.rs

//! Decides whether the acting principal may complete a given order.

use std::fmt;

use tracing::debug;

use crate::model::customer::{CustomerRef, Principal};
use crate::model::order::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
  /// The order belongs to a registered account and the caller is not logged in.
  LoginRequired,
  /// The caller is logged in as someone other than the order's customer.
  NotOwner,
}

impl fmt::Display for DenyReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DenyReason::LoginRequired => f.write_str("the order belongs to a registered customer, log in first"),
      DenyReason::NotOwner => f.write_str("the order belongs to another customer"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
  Allow,
  Deny(DenyReason),
}

impl Authorization {
  pub fn is_allowed(&self) -> bool {
    matches!(self, Authorization::Allow)
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGate;

impl AuthorizationGate {
  pub fn new() -> Self {
    Self
  }

  /// Checks `principal` against the customer an order is (or is about to be) placed for.
  ///
  /// | customer            | anonymous       | same customer | other customer |
  /// |---------------------|-----------------|---------------|----------------|
  /// | none                | allow           | allow         | allow          |
  /// | guest (no account)  | allow           | allow         | deny           |
  /// | registered account  | deny (login)    | allow         | deny           |
  ///
  /// A logged-in principal matches a guest reference only when the emails agree.
  pub fn authorize(&self, customer: Option<&CustomerRef>, principal: &Principal) -> Authorization {
    let decision = match (customer, principal) {
      (None, _) => Authorization::Allow,
      (Some(c), Principal::Anonymous) => match c.account {
        Some(_) => Authorization::Deny(DenyReason::LoginRequired),
        None => Authorization::Allow,
      },
      (Some(c), Principal::Customer { id, email }) => {
        let owns = match c.account {
          Some(account) => account == *id,
          None => c.email == *email,
        };
        if owns {
          Authorization::Allow
        } else {
          Authorization::Deny(DenyReason::NotOwner)
        }
      }
    };
    debug!(?decision, authenticated = principal.is_authenticated(), "Authorization decided.");
    decision
  }

  pub fn authorize_order(&self, order: &Order, principal: &Principal) -> Authorization {
    self.authorize(order.customer.as_ref(), principal)
  }
}
