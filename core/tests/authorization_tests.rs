// tests/authorization_tests.rs
mod common;

use checkout_core::{
  Authorization, AuthorizationGate, CheckoutCommand, CheckoutError, CompletionRequest, CustomerRef, DenyReason,
  ErrorKind, OrderToken, Principal,
};
use common::*;
use serial_test::serial;

fn complete_with(token: &str, email: Option<&str>) -> CheckoutCommand {
  CheckoutCommand::CompleteCheckout {
    token: OrderToken::new(token),
    request: CompletionRequest {
      email: email.map(common::email),
      notes: None,
    },
  }
}

#[test]
fn test_gate_decision_table() {
  let gate = AuthorizationGate::new();
  let guest = CustomerRef::guest(email(GUEST_EMAIL));
  let registered = CustomerRef::registered(email(REGISTERED_EMAIL), *OLIVER_ID);

  assert_eq!(gate.authorize(Some(&guest), &Principal::Anonymous), Authorization::Allow);
  assert_eq!(
    gate.authorize(Some(&registered), &Principal::Anonymous),
    Authorization::Deny(DenyReason::LoginRequired)
  );
  assert_eq!(gate.authorize(Some(&registered), &oliver()), Authorization::Allow);
  assert_eq!(
    gate.authorize(Some(&registered), &stranger()),
    Authorization::Deny(DenyReason::NotOwner)
  );
  assert_eq!(
    gate.authorize(Some(&guest), &oliver()),
    Authorization::Deny(DenyReason::NotOwner)
  );

  let oliver_as_guest = CustomerRef::guest(email(REGISTERED_EMAIL));
  assert!(gate.authorize(Some(&oliver_as_guest), &oliver()).is_allowed());
}

#[tokio::test]
#[serial]
async fn test_anonymous_cannot_complete_with_registered_email() {
  setup_tracing();
  let store = build_store();
  prepare_for_completion(&store.service, &Principal::Anonymous, "REGISTERED", "PBC").await;

  let err = store
    .service
    .handle(CHANNEL, &Principal::Anonymous, complete_with("REGISTERED", Some(REGISTERED_EMAIL)))
    .await
    .unwrap_err();
  assert!(matches!(err, CheckoutError::Unauthorized(DenyReason::LoginRequired)));
  assert_eq!(err.kind(), ErrorKind::Unauthorized);

  let order = store.service.summary(CHANNEL, &OrderToken::new("REGISTERED")).await.unwrap();
  assert!(!order.is_completed());
  assert!(order.customer.is_none());
}

#[tokio::test]
#[serial]
async fn test_logged_in_customer_cannot_complete_for_another_email() {
  setup_tracing();
  let store = build_store();
  prepare_for_completion(&store.service, &Principal::Anonymous, "OTHER_EMAIL", "PBC").await;

  let err = store
    .service
    .handle(CHANNEL, &oliver(), complete_with("OTHER_EMAIL", Some(GUEST_EMAIL)))
    .await
    .unwrap_err();
  assert!(matches!(err, CheckoutError::Unauthorized(DenyReason::NotOwner)));
}

#[tokio::test]
#[serial]
async fn test_logged_in_customer_completes_own_order_without_email() {
  setup_tracing();
  let store = build_store();
  prepare_for_completion(&store.service, &oliver(), "OLIVER", "PBC").await;

  store
    .service
    .handle(CHANNEL, &oliver(), complete_with("OLIVER", None))
    .await
    .unwrap();

  let order = store.service.summary(CHANNEL, &OrderToken::new("OLIVER")).await.unwrap();
  assert!(order.is_completed());
  assert_eq!(order.customer.unwrap().account, Some(*OLIVER_ID));
}

#[tokio::test]
#[serial]
async fn test_logged_in_customer_completes_with_own_email() {
  setup_tracing();
  let store = build_store();
  prepare_for_completion(&store.service, &Principal::Anonymous, "OWN_EMAIL", "PBC").await;

  store
    .service
    .handle(CHANNEL, &oliver(), complete_with("OWN_EMAIL", Some(REGISTERED_EMAIL)))
    .await
    .unwrap();
}

#[tokio::test]
#[serial]
async fn test_other_customer_cannot_complete_someone_elses_cart() {
  setup_tracing();
  let store = build_store();
  prepare_for_completion(&store.service, &oliver(), "STOLEN", "PBC").await;

  let err = store
    .service
    .handle(CHANNEL, &stranger(), complete_with("STOLEN", None))
    .await
    .unwrap_err();
  assert!(matches!(err, CheckoutError::Unauthorized(DenyReason::NotOwner)));

  let err = store
    .service
    .handle(CHANNEL, &Principal::Anonymous, complete_with("STOLEN", None))
    .await
    .unwrap_err();
  assert!(matches!(err, CheckoutError::Unauthorized(DenyReason::LoginRequired)));
}
