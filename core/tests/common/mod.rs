// tests/common/mod.rs
#![allow(dead_code)]

use checkout_core::{
  Address, Channel, ChannelCode, ChannelRegistry, CheckoutCommand, CheckoutError, CheckoutService,
  ConfiguredPaymentMethodsResolver, ConfiguredShippingMethodsResolver, ContextData, CustomerId, CustomerProvider,
  CustomerRef, Email, InMemoryOrderRepository, OrderToken, PaymentId, PaymentMethod, PipelineControl, Principal,
  Product, ProductCatalog, ShipmentId, ShippingMethod,
};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;

// --- Pipeline test context ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TestError {
  #[error("Checkout error: {0}")]
  Checkout(#[from] CheckoutError),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

pub fn create_simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> checkout_core::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, counter = guard.counter, "executed");
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> checkout_core::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Store fixture ---

pub const CHANNEL: &str = "WEB_GB";
pub const OTHER_CHANNEL: &str = "WEB_US";
pub const MUG: &str = "LOGAN_MUG_CODE";
pub const MUG_PRICE: i64 = 1999;
pub const DHL_FEE: i64 = 500;
pub const REGISTERED_EMAIL: &str = "oliver@queen.com";
pub const GUEST_EMAIL: &str = "example@customer.com";

pub static OLIVER_ID: Lazy<CustomerId> = Lazy::new(CustomerId::new);

/// A customer provider backed by a fixed list of registered accounts.
pub struct KnownCustomers(pub Vec<(Email, CustomerId)>);

impl CustomerProvider for KnownCustomers {
  fn provide(&self, email: &Email) -> CustomerRef {
    match self.0.iter().find(|(known, _)| known == email) {
      Some((email, id)) => CustomerRef::registered(email.clone(), *id),
      None => CustomerRef::guest(email.clone()),
    }
  }
}

pub fn email(raw: &str) -> Email {
  Email::parse(raw).unwrap()
}

pub fn oliver() -> Principal {
  Principal::Customer {
    id: *OLIVER_ID,
    email: email(REGISTERED_EMAIL),
  }
}

pub fn stranger() -> Principal {
  Principal::Customer {
    id: CustomerId::new(),
    email: email("someone@else.com"),
  }
}

pub fn channels() -> Vec<Channel> {
  vec![
    Channel {
      code: ChannelCode::new(CHANNEL),
      name: "UK Web Store".to_string(),
      base_currency: "GBP".to_string(),
      enabled: true,
    },
    Channel {
      code: ChannelCode::new(OTHER_CHANNEL),
      name: "US Web Store".to_string(),
      base_currency: "USD".to_string(),
      enabled: true,
    },
    Channel {
      code: ChannelCode::new("WEB_CLOSED"),
      name: "Closed Store".to_string(),
      base_currency: "EUR".to_string(),
      enabled: false,
    },
  ]
}

pub fn products() -> Vec<Product> {
  vec![
    Product {
      code: MUG.to_string(),
      name: "Logan Mug".to_string(),
      price: MUG_PRICE,
      weight: 350,
      channels: vec![],
    },
    Product {
      code: "ANVIL".to_string(),
      name: "Heavy Anvil".to_string(),
      price: 25_000,
      weight: 40_000,
      channels: vec![ChannelCode::new(CHANNEL)],
    },
  ]
}

pub fn shipping_methods() -> Vec<ShippingMethod> {
  vec![
    ShippingMethod {
      code: "DHL".to_string(),
      name: "DHL Express".to_string(),
      enabled: true,
      channels: vec![ChannelCode::new(CHANNEL), ChannelCode::new(OTHER_CHANNEL)],
      fee: DHL_FEE,
      max_weight: None,
      position: 0,
    },
    ShippingMethod {
      code: "FEDEX".to_string(),
      name: "FedEx".to_string(),
      enabled: true,
      channels: vec![ChannelCode::new(CHANNEL)],
      fee: 1000,
      max_weight: Some(10_000),
      position: 1,
    },
  ]
}

pub fn payment_methods() -> Vec<PaymentMethod> {
  vec![
    PaymentMethod {
      code: "PBC".to_string(),
      name: "Pay by check".to_string(),
      description: None,
      enabled: true,
      channels: vec![ChannelCode::new(CHANNEL)],
      currencies: vec![],
      min_amount: None,
      max_amount: None,
      position: 1,
    },
    PaymentMethod {
      code: "COD".to_string(),
      name: "Cash on delivery".to_string(),
      description: Some("Pay the courier".to_string()),
      enabled: true,
      channels: vec![ChannelCode::new(CHANNEL)],
      currencies: vec!["GBP".to_string()],
      min_amount: None,
      max_amount: Some(10_000),
      position: 0,
    },
    PaymentMethod {
      code: "US_CARD".to_string(),
      name: "Card (US only)".to_string(),
      description: None,
      enabled: true,
      channels: vec![ChannelCode::new(OTHER_CHANNEL)],
      currencies: vec![],
      min_amount: None,
      max_amount: None,
      position: 0,
    },
    PaymentMethod {
      code: "RETIRED".to_string(),
      name: "Retired method".to_string(),
      description: None,
      enabled: false,
      channels: vec![ChannelCode::new(CHANNEL)],
      currencies: vec![],
      min_amount: None,
      max_amount: None,
      position: 2,
    },
  ]
}

pub struct TestStore {
  pub service: CheckoutService,
  pub orders: Arc<InMemoryOrderRepository>,
  pub payments: Arc<ConfiguredPaymentMethodsResolver>,
}

pub fn build_store() -> TestStore {
  let orders = Arc::new(InMemoryOrderRepository::new());
  let payments = Arc::new(ConfiguredPaymentMethodsResolver::new(payment_methods()));
  let service = CheckoutService::new(
    Arc::new(ChannelRegistry::new(channels())),
    Arc::new(ProductCatalog::new(products())),
    orders.clone(),
    Arc::new(ConfiguredShippingMethodsResolver::new(shipping_methods())),
    payments.clone(),
    Arc::new(KnownCustomers(vec![(email(REGISTERED_EMAIL), *OLIVER_ID)])),
  );
  TestStore {
    service,
    orders,
    payments,
  }
}

pub fn sherlock_address() -> Address {
  Address {
    first_name: "Sherlock".to_string(),
    last_name: "Holmes".to_string(),
    street: "Baker Street 221b".to_string(),
    city: "London".to_string(),
    postcode: "NWB".to_string(),
    country_code: "GB".to_string(),
    province_name: None,
    province_code: None,
    company: None,
    phone_number: None,
  }
}

/// Drives a fresh cart through every step up to `PaymentSelected`.
pub async fn prepare_for_completion(service: &CheckoutService, principal: &Principal, token: &str, payment: &str) {
  let token = OrderToken::new(token);
  let commands = vec![
    CheckoutCommand::PickupCart {
      token: Some(token.clone()),
    },
    CheckoutCommand::PutItemToCart {
      token: token.clone(),
      product_code: MUG.to_string(),
      quantity: 5,
    },
    CheckoutCommand::AddressOrder {
      token: token.clone(),
      billing: None,
      shipping: sherlock_address(),
    },
    CheckoutCommand::ChooseShippingMethod {
      token: token.clone(),
      shipment_id: ShipmentId(0),
      method: "DHL".to_string(),
    },
    CheckoutCommand::ChoosePaymentMethod {
      token: token.clone(),
      payment_id: PaymentId(0),
      method: payment.to_string(),
    },
  ];
  for command in commands {
    service
      .handle(CHANNEL, principal, command)
      .await
      .expect("checkout preparation step failed");
  }
}
