//! Customer identity: validated emails, registered accounts, guest references and
//! the acting principal of a request.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
  #[error("email cannot be empty")]
  Empty,
  #[error("email must be at most {max} characters")]
  TooLong { max: usize },
  #[error("email must contain exactly one @ symbol")]
  MissingAtSymbol,
  #[error("email local part cannot be empty")]
  EmptyLocalPart,
  #[error("email domain cannot be empty")]
  EmptyDomain,
}

/// An email address with basic structural validation.
///
/// Stored lowercased so lookups in the customer directory are case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
  /// Maximum length of an email address (RFC 5321).
  pub const MAX_LENGTH: usize = 254;

  /// # Errors
  ///
  /// Returns an error if the input is empty, longer than 254 characters, does not
  /// contain exactly one `@`, or has an empty local part or domain.
  pub fn parse(s: &str) -> Result<Self, EmailError> {
    let s = s.trim();
    if s.is_empty() {
      return Err(EmailError::Empty);
    }
    if s.len() > Self::MAX_LENGTH {
      return Err(EmailError::TooLong { max: Self::MAX_LENGTH });
    }
    let mut parts = s.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
      return Err(EmailError::MissingAtSymbol);
    };
    if local.is_empty() {
      return Err(EmailError::EmptyLocalPart);
    }
    if domain.is_empty() {
      return Err(EmailError::EmptyDomain);
    }
    Ok(Self(s.to_lowercase()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Email {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl TryFrom<String> for Email {
  type Error = EmailError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::parse(&value)
  }
}

impl From<Email> for String {
  fn from(email: Email) -> Self {
    email.0
  }
}

/// Identifier of a registered customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
  pub fn new() -> Self {
    Self(Uuid::new_v4())
  }
}

impl Default for CustomerId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for CustomerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// The customer an order is placed for.
///
/// `account` is set when the email belongs to a registered customer; a reference
/// without an account is a guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
  pub email: Email,
  pub account: Option<CustomerId>,
}

impl CustomerRef {
  pub fn guest(email: Email) -> Self {
    Self { email, account: None }
  }

  pub fn registered(email: Email, id: CustomerId) -> Self {
    Self {
      email,
      account: Some(id),
    }
  }

  pub fn is_guest(&self) -> bool {
    self.account.is_none()
  }
}

/// Who is acting on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
  /// Identified only by holding the cart token.
  Anonymous,
  /// A logged-in customer.
  Customer { id: CustomerId, email: Email },
}

impl Principal {
  pub fn is_authenticated(&self) -> bool {
    matches!(self, Principal::Customer { .. })
  }

  pub fn customer_ref(&self) -> Option<CustomerRef> {
    match self {
      Principal::Anonymous => None,
      Principal::Customer { id, email } => Some(CustomerRef::registered(email.clone(), *id)),
    }
  }
}

/// Maps an email onto a customer reference, registered when an account owns the email.
pub trait CustomerProvider: Send + Sync {
  fn provide(&self, email: &Email) -> CustomerRef;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_and_normalises_email() {
    let email = Email::parse("  Example@Customer.com ").unwrap();
    assert_eq!(email.as_str(), "example@customer.com");
  }

  #[test]
  fn rejects_malformed_emails() {
    assert_eq!(Email::parse(""), Err(EmailError::Empty));
    assert_eq!(Email::parse("no-at-symbol"), Err(EmailError::MissingAtSymbol));
    assert_eq!(Email::parse("a@b@c"), Err(EmailError::MissingAtSymbol));
    assert_eq!(Email::parse("@domain.com"), Err(EmailError::EmptyLocalPart));
    assert_eq!(Email::parse("user@"), Err(EmailError::EmptyDomain));
    let long = format!("{}@example.com", "a".repeat(250));
    assert_eq!(Email::parse(&long), Err(EmailError::TooLong { max: 254 }));
  }

  #[test]
  fn email_deserialization_validates() {
    let ok: Result<Email, _> = serde_json::from_str("\"oliver@queen.com\"");
    assert!(ok.is_ok());
    let bad: Result<Email, _> = serde_json::from_str("\"oliver\"");
    assert!(bad.is_err());
  }

  #[test]
  fn principal_customer_ref_is_registered() {
    let id = CustomerId::new();
    let principal = Principal::Customer {
      id,
      email: Email::parse("oliver@queen.com").unwrap(),
    };
    let customer = principal.customer_ref().unwrap();
    assert_eq!(customer.account, Some(id));
    assert!(Principal::Anonymous.customer_ref().is_none());
  }
}
