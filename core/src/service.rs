// checkout_core/src/service.rs

//! Command dispatch over the order aggregate.
//!
//! The service resolves the channel, loads the order, applies exactly one transition
//! to a working copy and saves it only when the transition succeeded.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::authorization::AuthorizationGate;
use crate::error::{CheckoutError, CheckoutResult};
use crate::model::address::Address;
use crate::model::catalog::ProductCatalog;
use crate::model::channel::{Channel, ChannelRegistry};
use crate::model::customer::{CustomerProvider, Principal};
use crate::model::order::{CheckoutState, CompletionRequest, Order, OrderToken, PaymentId, ShipmentId};
use crate::repository::OrderRepository;
use crate::resolver::payment::{PaymentMethod, PaymentMethodsResolver};
use crate::resolver::shipping::{ShippingMethod, ShippingMethodsResolver};
use crate::validation::{ChoosePaymentMethodRequest, PaymentMethodValidator};

/// Everything a shopper can ask the checkout to do.
#[derive(Debug, Clone)]
pub enum CheckoutCommand {
  /// Starts a cart. A token is generated when none is given.
  PickupCart { token: Option<OrderToken> },
  PutItemToCart {
    token: OrderToken,
    product_code: String,
    quantity: u32,
  },
  ChangeItemQuantity {
    token: OrderToken,
    product_code: String,
    quantity: u32,
  },
  RemoveItemFromCart { token: OrderToken, product_code: String },
  AddressOrder {
    token: OrderToken,
    billing: Option<Address>,
    shipping: Address,
  },
  ChooseShippingMethod {
    token: OrderToken,
    shipment_id: ShipmentId,
    method: String,
  },
  ChoosePaymentMethod {
    token: OrderToken,
    payment_id: PaymentId,
    method: String,
  },
  CompleteCheckout {
    token: OrderToken,
    request: CompletionRequest,
  },
}

impl CheckoutCommand {
  pub fn name(&self) -> &'static str {
    match self {
      CheckoutCommand::PickupCart { .. } => "pickup_cart",
      CheckoutCommand::PutItemToCart { .. } => "put_item_to_cart",
      CheckoutCommand::ChangeItemQuantity { .. } => "change_item_quantity",
      CheckoutCommand::RemoveItemFromCart { .. } => "remove_item_from_cart",
      CheckoutCommand::AddressOrder { .. } => "address_order",
      CheckoutCommand::ChooseShippingMethod { .. } => "choose_shipping_method",
      CheckoutCommand::ChoosePaymentMethod { .. } => "choose_payment_method",
      CheckoutCommand::CompleteCheckout { .. } => "complete_checkout",
    }
  }
}

/// Result of a successfully applied command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
  pub token: OrderToken,
  pub state: CheckoutState,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentOptions {
  pub shipment_id: ShipmentId,
  pub methods: Vec<ShippingMethod>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOptions {
  pub payment_id: PaymentId,
  pub methods: Vec<PaymentMethod>,
}

pub struct CheckoutService {
  channels: Arc<ChannelRegistry>,
  catalog: Arc<ProductCatalog>,
  orders: Arc<dyn OrderRepository>,
  shipping: Arc<dyn ShippingMethodsResolver>,
  payments: Arc<dyn PaymentMethodsResolver>,
  customers: Arc<dyn CustomerProvider>,
  gate: AuthorizationGate,
}

impl CheckoutService {
  pub fn new(
    channels: Arc<ChannelRegistry>,
    catalog: Arc<ProductCatalog>,
    orders: Arc<dyn OrderRepository>,
    shipping: Arc<dyn ShippingMethodsResolver>,
    payments: Arc<dyn PaymentMethodsResolver>,
    customers: Arc<dyn CustomerProvider>,
  ) -> Self {
    Self {
      channels,
      catalog,
      orders,
      shipping,
      payments,
      customers,
      gate: AuthorizationGate::new(),
    }
  }

  pub fn payment_method_validator(&self) -> PaymentMethodValidator {
    PaymentMethodValidator::new(self.orders.clone(), self.payments.clone())
  }

  /// Applies `command` in the context of `channel` on behalf of `principal`.
  ///
  /// The channel is resolved before anything else, so an unknown channel fails with
  /// `ChannelNotFound` whatever state the order is in.
  #[instrument(
    name = "CheckoutService::handle",
    skip(self, principal, command),
    fields(channel = %channel, command = command.name(), authenticated = principal.is_authenticated()),
    err(Display)
  )]
  pub async fn handle(
    &self,
    channel: &str,
    principal: &Principal,
    command: CheckoutCommand,
  ) -> CheckoutResult<CommandOutcome> {
    let channel = self.resolve_channel(channel)?;

    match command {
      CheckoutCommand::PickupCart { token } => self.pickup(&channel, principal, token).await,
      CheckoutCommand::PutItemToCart {
        token,
        product_code,
        quantity,
      } => {
        let product = self.catalog.find(&product_code, &channel.code)?;
        self
          .apply(&channel, &token, |order| order.add_item(product, quantity))
          .await
      }
      CheckoutCommand::ChangeItemQuantity {
        token,
        product_code,
        quantity,
      } => {
        self
          .apply(&channel, &token, |order| order.change_item_quantity(&product_code, quantity))
          .await
      }
      CheckoutCommand::RemoveItemFromCart { token, product_code } => {
        self
          .apply(&channel, &token, |order| order.remove_item(&product_code))
          .await
      }
      CheckoutCommand::AddressOrder {
        token,
        billing,
        shipping,
      } => {
        self
          .apply(&channel, &token, |order| order.address(billing, shipping))
          .await
      }
      CheckoutCommand::ChooseShippingMethod {
        token,
        shipment_id,
        method,
      } => {
        self
          .apply(&channel, &token, |order| {
            order.choose_shipping_method(shipment_id, &method, self.shipping.as_ref())
          })
          .await
      }
      CheckoutCommand::ChoosePaymentMethod {
        token,
        payment_id,
        method,
      } => {
        let request = ChoosePaymentMethodRequest {
          token,
          payment_id,
          method,
        };
        let mut violations = request.validate_fields();
        if violations.is_empty() {
          violations.extend(self.payment_method_validator().validate(&request).await?);
        }
        violations.into_result()?;
        self
          .apply(&channel, &request.token, |order| {
            order.choose_payment_method(request.payment_id, &request.method, self.payments.as_ref())
          })
          .await
      }
      CheckoutCommand::CompleteCheckout { token, request } => {
        self
          .apply(&channel, &token, |order| self.complete_order(order, request, principal))
          .await
      }
    }
  }

  /// Loads the order, runs `transition` on a working copy and saves it only on success.
  async fn apply<F>(&self, channel: &Channel, token: &OrderToken, transition: F) -> CheckoutResult<CommandOutcome>
  where
    F: FnOnce(&mut Order) -> CheckoutResult<CheckoutState>,
  {
    let mut order = self.load_order(channel, token).await?;
    let state = transition(&mut order)?;
    self.save(&order).await?;
    debug!(token = %order.token, %state, "Command applied.");
    Ok(CommandOutcome {
      token: order.token,
      state,
    })
  }

  /// Looks up an enabled channel by code.
  pub fn resolve_channel(&self, code: &str) -> CheckoutResult<Channel> {
    self.channels.find(code).cloned()
  }

  /// Loads an order that belongs to `channel`. Orders of other channels are reported as missing.
  #[instrument(name = "CheckoutService::load_order", skip(self, channel), fields(channel = %channel.code))]
  pub async fn load_order(&self, channel: &Channel, token: &OrderToken) -> CheckoutResult<Order> {
    let order = self
      .orders
      .find_by_token(token)
      .await?
      .ok_or_else(|| CheckoutError::OrderNotFound {
        token: token.to_string(),
      })?;
    if order.channel != channel.code {
      warn!(order_channel = %order.channel, "Order requested through a foreign channel.");
      return Err(CheckoutError::OrderNotFound {
        token: token.to_string(),
      });
    }
    Ok(order)
  }

  /// Runs the terminal transition against `order` using the service's collaborators.
  pub fn complete_order(
    &self,
    order: &mut Order,
    request: CompletionRequest,
    principal: &Principal,
  ) -> CheckoutResult<CheckoutState> {
    let state = order.complete(
      request,
      principal,
      self.customers.as_ref(),
      &self.gate,
      self.shipping.as_ref(),
      self.payments.as_ref(),
    )?;
    info!(token = %order.token, total = order.total(), "Checkout completed.");
    Ok(state)
  }

  pub async fn save(&self, order: &Order) -> CheckoutResult<()> {
    self.orders.save(order).await
  }

  pub async fn summary(&self, channel: &str, token: &OrderToken) -> CheckoutResult<Order> {
    let channel = self.resolve_channel(channel)?;
    self.load_order(&channel, token).await
  }

  /// Shipping methods currently offered for each shipment. Computed fresh on every call.
  pub async fn available_shipping_methods(
    &self,
    channel: &str,
    token: &OrderToken,
  ) -> CheckoutResult<Vec<ShipmentOptions>> {
    let order = self.summary(channel, token).await?;
    Ok(
      order
        .shipments
        .iter()
        .map(|shipment| ShipmentOptions {
          shipment_id: shipment.id,
          methods: self.shipping.offered_methods(&order, shipment),
        })
        .collect(),
    )
  }

  /// Payment methods currently eligible for each payment. Computed fresh on every call.
  pub async fn available_payment_methods(
    &self,
    channel: &str,
    token: &OrderToken,
  ) -> CheckoutResult<Vec<PaymentOptions>> {
    let order = self.summary(channel, token).await?;
    Ok(
      order
        .payments
        .iter()
        .map(|payment| PaymentOptions {
          payment_id: payment.id,
          methods: self.payments.eligible_methods(&order, payment),
        })
        .collect(),
    )
  }

  async fn pickup(
    &self,
    channel: &Channel,
    principal: &Principal,
    token: Option<OrderToken>,
  ) -> CheckoutResult<CommandOutcome> {
    let token = token.unwrap_or_else(OrderToken::generate);
    let order = Order::pickup(token, channel, principal.customer_ref());
    if !self.orders.insert_new(&order).await? {
      return Err(CheckoutError::CartAlreadyExists {
        token: order.token.to_string(),
      });
    }
    info!(token = %order.token, channel = %channel.code, "Cart picked up.");
    Ok(CommandOutcome {
      token: order.token,
      state: order.state,
    })
  }
}
