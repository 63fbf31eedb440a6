// shop_api/tests/checkout_api_tests.rs

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use checkout_core::InMemoryOrderRepository;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use shop_api::config::AppConfig;
use shop_api::fixtures::StoreFixture;
use shop_api::state::AppState;
use shop_api::{build_state_with, configure_app_routes};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

const CHANNEL: &str = "WEB_GB";
const MUG: &str = "LOGAN_MUG_CODE";
const OLIVER: &str = "oliver@queen.com";
const OLIVER_PASSWORD: &str = "123password";
const GUEST: &str = "example@customer.com";

static TRACING: Lazy<()> = Lazy::new(|| {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,shop_api=debug"));
  let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
});

fn state_with(config: AppConfig) -> AppState {
  Lazy::force(&TRACING);
  build_state_with(
    config,
    StoreFixture::builtin().expect("builtin store"),
    Arc::new(InMemoryOrderRepository::new()),
  )
  .expect("app state")
}

fn test_state() -> AppState {
  state_with(AppConfig::default())
}

fn cart_uri(token: &str, suffix: &str) -> String {
  format!("/shop-api/{}/carts/{}{}", CHANNEL, token, suffix)
}

fn checkout_uri(token: &str, suffix: &str) -> String {
  format!("/shop-api/{}/checkout/{}{}", CHANNEL, token, suffix)
}

fn authed(req: test::TestRequest, bearer: Option<&str>) -> test::TestRequest {
  match bearer {
    Some(token) => req.insert_header(("Authorization", format!("Bearer {}", token))),
    None => req,
  }
}

fn sherlock_address() -> Value {
  json!({
    "firstName": "Sherlock",
    "lastName": "Holmes",
    "street": "Baker Street 221b",
    "city": "London",
    "postcode": "NW1",
    "countryCode": "GB"
  })
}

macro_rules! init_app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

macro_rules! send {
  ($app:expr, $req:expr) => {
    test::call_service(&$app, $req.to_request()).await
  };
}

/// Picks up a cart, adds five mugs, addresses it and ships it with DHL.
macro_rules! prepare_shipping {
  ($app:expr, $token:expr, $bearer:expr) => {{
    let resp = send!($app, authed(test::TestRequest::post().uri(&cart_uri($token, "")), $bearer));
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send!(
      $app,
      authed(
        test::TestRequest::post()
          .uri(&cart_uri($token, "/items"))
          .set_json(json!({ "productCode": MUG, "quantity": 5 })),
        $bearer
      )
    );
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send!(
      $app,
      authed(
        test::TestRequest::put()
          .uri(&checkout_uri($token, "/address"))
          .set_json(json!({ "shippingAddress": sherlock_address() })),
        $bearer
      )
    );
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send!(
      $app,
      authed(
        test::TestRequest::put()
          .uri(&checkout_uri($token, "/shipping/0"))
          .set_json(json!({ "method": "DHL" })),
        $bearer
      )
    );
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }};
}

macro_rules! prepare_for_completion {
  ($app:expr, $token:expr, $bearer:expr, $payment:expr) => {{
    prepare_shipping!($app, $token, $bearer);
    let resp = send!(
      $app,
      authed(
        test::TestRequest::put()
          .uri(&checkout_uri($token, "/payment/0"))
          .set_json(json!({ "method": $payment })),
        $bearer
      )
    );
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }};
}

macro_rules! login {
  ($app:expr, $email:expr, $password:expr) => {{
    let resp = send!(
      $app,
      test::TestRequest::post()
        .uri("/shop-api/login")
        .set_json(json!({ "email": $email, "password": $password }))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    body["token"].as_str().expect("session token").to_string()
  }};
}

macro_rules! checkout_summary {
  ($app:expr, $token:expr) => {{
    let resp = send!($app, test::TestRequest::get().uri(&checkout_uri($token, "")));
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    body
  }};
}

#[actix_web::test]
async fn health_endpoint_reports_ok() {
  let state = test_state();
  let app = init_app!(state);

  let resp = send!(app, test::TestRequest::get().uri("/shop-api/health"));
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_web::test]
async fn guest_completes_checkout_with_email() {
  let state = test_state();
  let app = init_app!(state);
  prepare_for_completion!(app, "GUEST_CART", None, "PBC");

  let resp = send!(
    app,
    test::TestRequest::put()
      .uri(&checkout_uri("GUEST_CART", "/complete"))
      .set_json(json!({ "email": GUEST }))
  );
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let summary = checkout_summary!(app, "GUEST_CART");
  assert_eq!(summary["checkoutState"], "completed");
  assert_eq!(summary["customerEmail"], GUEST);
  assert_eq!(summary["totals"]["total"], 5 * 1999 + 500);

  let sent = state.mailer.sent();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].to, GUEST);
}

#[actix_web::test]
async fn completion_keeps_customer_notes() {
  let state = test_state();
  let app = init_app!(state);
  prepare_for_completion!(app, "NOTES_CART", None, "COD");

  let resp = send!(
    app,
    test::TestRequest::put()
      .uri(&checkout_uri("NOTES_CART", "/complete"))
      .set_json(json!({ "email": GUEST, "notes": "Please ring twice." }))
  );
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let summary = checkout_summary!(app, "NOTES_CART");
  assert_eq!(summary["notes"], "Please ring twice.");
}

#[actix_web::test]
async fn unknown_channel_is_reported_before_anything_else() {
  let state = test_state();
  let app = init_app!(state);

  let resp = send!(
    app,
    test::TestRequest::put()
      .uri("/shop-api/SPACE_KLINGON/checkout/WHATEVER/complete")
      .set_json(json!({ "email": GUEST }))
  );
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(
    body,
    json!({
      "code": 404,
      "error": "channel_has_not_been_found",
      "message": "Channel has not been found."
    })
  );
}

#[actix_web::test]
async fn unknown_channel_wins_over_a_ready_cart_and_a_bad_payload() {
  let state = test_state();
  let app = init_app!(state);
  prepare_for_completion!(app, "READY_CART", None, "PBC");

  let bodies = [
    json!({ "email": GUEST }).to_string(),
    json!({ "email": "not-an-email" }).to_string(),
    r#"{"email": "#.to_string(),
  ];
  for body in bodies {
    let resp = send!(
      app,
      test::TestRequest::put()
        .uri("/shop-api/SPACE_KLINGON/checkout/READY_CART/complete")
        .insert_header(ContentType::json())
        .set_payload(body)
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "channel_has_not_been_found");
  }

  let summary = checkout_summary!(app, "READY_CART");
  assert_eq!(summary["checkoutState"], "payment_selected");
  assert!(state.mailer.sent().is_empty());
}

#[actix_web::test]
async fn unknown_cart_in_known_channel_is_not_found() {
  let state = test_state();
  let app = init_app!(state);

  let resp = send!(
    app,
    test::TestRequest::put()
      .uri(&checkout_uri("NO_SUCH_CART", "/complete"))
      .set_json(json!({ "email": GUEST }))
  );
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "cart_has_not_been_found");
}

#[actix_web::test]
async fn anonymous_shopper_cannot_use_registered_email() {
  let state = test_state();
  let app = init_app!(state);
  prepare_for_completion!(app, "SNEAKY_CART", None, "PBC");

  let resp = send!(
    app,
    test::TestRequest::put()
      .uri(&checkout_uri("SNEAKY_CART", "/complete"))
      .set_json(json!({ "email": OLIVER }))
  );
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let summary = checkout_summary!(app, "SNEAKY_CART");
  assert_eq!(summary["checkoutState"], "payment_selected");
  assert!(state.mailer.sent().is_empty());
}

#[actix_web::test]
async fn other_customer_cannot_complete_foreign_cart() {
  let state = test_state();
  let app = init_app!(state);

  let resp = send!(
    app,
    test::TestRequest::post()
      .uri(&format!("/shop-api/{}/register", CHANNEL))
      .set_json(json!({ "email": "john@doe.com", "password": "john-secret", "firstName": "John" }))
  );
  assert_eq!(resp.status(), StatusCode::CREATED);

  let oliver_token = login!(app, OLIVER, OLIVER_PASSWORD);
  let john_token = login!(app, "john@doe.com", "john-secret");
  prepare_for_completion!(app, "OLIVER_CART", Some(oliver_token.as_str()), "PBC");

  let resp = send!(
    app,
    authed(
      test::TestRequest::put().uri(&checkout_uri("OLIVER_CART", "/complete")),
      Some(john_token.as_str())
    )
  );
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let resp = send!(
    app,
    authed(
      test::TestRequest::put().uri(&checkout_uri("OLIVER_CART", "/complete")),
      Some(oliver_token.as_str())
    )
  );
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  let summary = checkout_summary!(app, "OLIVER_CART");
  assert_eq!(summary["customerEmail"], OLIVER);
}

#[actix_web::test]
async fn logged_in_customer_completes_anonymous_cart_without_body() {
  let state = test_state();
  let app = init_app!(state);
  prepare_for_completion!(app, "LATE_LOGIN_CART", None, "PBC");
  let oliver_token = login!(app, OLIVER, OLIVER_PASSWORD);

  let resp = send!(
    app,
    authed(
      test::TestRequest::put().uri(&checkout_uri("LATE_LOGIN_CART", "/complete")),
      Some(oliver_token.as_str())
    )
  );
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let summary = checkout_summary!(app, "LATE_LOGIN_CART");
  assert_eq!(summary["checkoutState"], "completed");
  assert_eq!(summary["customerEmail"], OLIVER);
  let sent = state.mailer.sent();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].to, OLIVER);
}

#[actix_web::test]
async fn logged_in_customer_cannot_complete_for_someone_else() {
  let state = test_state();
  let app = init_app!(state);
  prepare_for_completion!(app, "ON_BEHALF_CART", None, "PBC");
  let oliver_token = login!(app, OLIVER, OLIVER_PASSWORD);

  let resp = send!(
    app,
    authed(
      test::TestRequest::put()
        .uri(&checkout_uri("ON_BEHALF_CART", "/complete"))
        .set_json(json!({ "email": GUEST })),
      Some(oliver_token.as_str())
    )
  );
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let summary = checkout_summary!(app, "ON_BEHALF_CART");
  assert_eq!(summary["checkoutState"], "payment_selected");
  assert!(state.mailer.sent().is_empty());
}

#[actix_web::test]
async fn malformed_completion_body_is_rejected_not_ignored() {
  let state = test_state();
  let app = init_app!(state);
  prepare_for_completion!(app, "MALFORMED_CART", None, "PBC");
  let oliver_token = login!(app, OLIVER, OLIVER_PASSWORD);
  let wrong_notes = json!({ "email": GUEST, "notes": 42 }).to_string();

  for bearer in [None, Some(oliver_token.as_str())] {
    let resp = send!(
      app,
      authed(
        test::TestRequest::put()
          .uri(&checkout_uri("MALFORMED_CART", "/complete"))
          .insert_header(ContentType::json())
          .set_payload(wrong_notes.clone()),
        bearer
      )
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_failed");
  }

  let summary = checkout_summary!(app, "MALFORMED_CART");
  assert_eq!(summary["checkoutState"], "payment_selected");
  assert!(state.mailer.sent().is_empty());
}

#[actix_web::test]
async fn unknown_bearer_token_is_rejected() {
  let state = test_state();
  let app = init_app!(state);
  prepare_for_completion!(app, "TOKEN_CART", None, "PBC");

  let resp = send!(
    app,
    authed(
      test::TestRequest::put()
        .uri(&checkout_uri("TOKEN_CART", "/complete"))
        .set_json(json!({ "email": GUEST })),
      Some("not-a-session")
    )
  );
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn ineligible_payment_method_is_a_violation_and_changes_nothing() {
  let state = test_state();
  let app = init_app!(state);
  prepare_shipping!(app, "INELIGIBLE_CART", None);

  let resp = send!(
    app,
    test::TestRequest::put()
      .uri(&checkout_uri("INELIGIBLE_CART", "/payment/0"))
      .set_json(json!({ "method": "CARD_US" }))
  );
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["code"], 400);
  assert_eq!(body["message"], "Validation failed");
  assert_eq!(
    body["errors"],
    json!({ "method": ["shop_api.checkout.payment_method.not_valid"] })
  );

  let summary = checkout_summary!(app, "INELIGIBLE_CART");
  assert_eq!(summary["checkoutState"], "shipping_selected");
}

#[actix_web::test]
async fn payment_listing_only_offers_eligible_methods() {
  let state = test_state();
  let app = init_app!(state);
  prepare_shipping!(app, "LISTING_CART", None);

  let resp = send!(app, test::TestRequest::get().uri(&checkout_uri("LISTING_CART", "/payment")));
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  let codes: Vec<&str> = body[0]["methods"]
    .as_array()
    .expect("methods")
    .iter()
    .filter_map(|m| m["code"].as_str())
    .collect();
  assert_eq!(codes, vec!["PBC", "COD"]);
}

#[actix_web::test]
async fn re_addressing_with_identical_address_keeps_progress() {
  let state = test_state();
  let app = init_app!(state);
  prepare_for_completion!(app, "READDRESS_CART", None, "PBC");

  let resp = send!(
    app,
    test::TestRequest::put()
      .uri(&checkout_uri("READDRESS_CART", "/address"))
      .set_json(json!({ "shippingAddress": sherlock_address() }))
  );
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let summary = checkout_summary!(app, "READDRESS_CART");
  assert_eq!(summary["checkoutState"], "payment_selected");
}

#[actix_web::test]
async fn blank_address_fields_are_listed() {
  let state = test_state();
  let app = init_app!(state);

  let resp = send!(app, test::TestRequest::post().uri(&cart_uri("BLANK_CART", "")));
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send!(
    app,
    test::TestRequest::put()
      .uri(&checkout_uri("BLANK_CART", "/address"))
      .set_json(json!({
        "shippingAddress": {
          "firstName": "", "lastName": "Holmes", "street": "Baker Street 221b",
          "city": " ", "postcode": "NW1", "countryCode": "GB"
        }
      }))
  );
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["errors"].get("shippingAddress.firstName").is_some());
  assert!(body["errors"].get("shippingAddress.city").is_some());
}

#[actix_web::test]
async fn completing_twice_conflicts_without_second_email() {
  let state = test_state();
  let app = init_app!(state);
  prepare_for_completion!(app, "TWICE_CART", None, "PBC");

  let complete = || {
    test::TestRequest::put()
      .uri(&checkout_uri("TWICE_CART", "/complete"))
      .set_json(json!({ "email": GUEST }))
  };
  let resp = send!(app, complete());
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = send!(app, complete());
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  assert_eq!(state.mailer.sent().len(), 1);
}

#[actix_web::test]
async fn disabled_confirmation_emails_are_skipped() {
  let state = state_with(AppConfig {
    send_confirmation_emails: false,
    ..AppConfig::default()
  });
  let app = init_app!(state);
  prepare_for_completion!(app, "QUIET_CART", None, "PBC");

  let resp = send!(
    app,
    test::TestRequest::put()
      .uri(&checkout_uri("QUIET_CART", "/complete"))
      .set_json(json!({ "email": GUEST }))
  );
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  assert!(state.mailer.sent().is_empty());
}

#[actix_web::test]
async fn duplicate_cart_pickup_conflicts() {
  let state = test_state();
  let app = init_app!(state);

  let resp = send!(app, test::TestRequest::post().uri(&cart_uri("DUP_CART", "")));
  assert_eq!(resp.status(), StatusCode::CREATED);
  let resp = send!(app, test::TestRequest::post().uri(&cart_uri("DUP_CART", "")));
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn non_positive_quantity_is_a_violation() {
  let state = test_state();
  let app = init_app!(state);

  let resp = send!(app, test::TestRequest::post().uri(&cart_uri("QTY_CART", "")));
  assert_eq!(resp.status(), StatusCode::CREATED);
  let resp = send!(
    app,
    test::TestRequest::post()
      .uri(&cart_uri("QTY_CART", "/items"))
      .set_json(json!({ "productCode": MUG, "quantity": -2 }))
  );
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["errors"]["quantity"], json!(["shop_api.cart.quantity.not_positive"]));
}

#[actix_web::test]
async fn registration_rejects_taken_email_and_weak_input() {
  let state = test_state();
  let app = init_app!(state);
  let register_uri = format!("/shop-api/{}/register", CHANNEL);

  let resp = send!(
    app,
    test::TestRequest::post()
      .uri(&register_uri)
      .set_json(json!({ "email": OLIVER, "password": "another-password" }))
  );
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = send!(
    app,
    test::TestRequest::post()
      .uri(&register_uri)
      .set_json(json!({ "email": "not-an-email", "password": "short" }))
  );
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["errors"].get("email").is_some());
  assert!(body["errors"].get("password").is_some());

  let resp = send!(
    app,
    test::TestRequest::post()
      .uri("/shop-api/SPACE_KLINGON/register")
      .set_json(json!({ "email": "kirk@enterprise.com", "password": "beam-me-up" }))
  );
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn login_with_wrong_password_is_unauthorized() {
  let state = test_state();
  let app = init_app!(state);

  let resp = send!(
    app,
    test::TestRequest::post()
      .uri("/shop-api/login")
      .set_json(json!({ "email": OLIVER, "password": "wrong-password" }))
  );
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
