// src/lib.rs

//! Checkout core: the order aggregate and its checkout state machine, payment-method
//! eligibility, request validation, the authorization gate, and a small named-step
//! async pipeline used to compose request workflows.
//!
//! The crate knows nothing about HTTP. Transports drive it through
//! [`CheckoutService::handle`] or by running a [`Pipeline`] whose steps call into the
//! service.

pub mod authorization;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod validation;
pub mod workflow;

// --- Re-exports for the Public API ---

pub use crate::authorization::{Authorization, AuthorizationGate, DenyReason};
pub use crate::error::{CheckoutError, CheckoutResult, ErrorKind, MethodKind};
pub use crate::model::{
  Address, Channel, ChannelCode, ChannelRegistry, CheckoutState, CompletionRequest, CustomerId, CustomerProvider,
  CustomerRef, Email, EmailError, LineItem, Order, OrderToken, Payment, PaymentId, Principal, Product, ProductCatalog,
  Shipment, ShipmentId,
};
pub use crate::pipeline::Pipeline;
pub use crate::repository::{InMemoryOrderRepository, OrderRepository};
pub use crate::resolver::{
  ConfiguredPaymentMethodsResolver, ConfiguredShippingMethodsResolver, PaymentMethod, PaymentMethodsResolver,
  ShippingMethod, ShippingMethodsResolver,
};
pub use crate::service::{CheckoutCommand, CheckoutService, CommandOutcome, PaymentOptions, ShipmentOptions};
pub use crate::validation::{ChoosePaymentMethodRequest, PaymentMethodValidator, Violation, Violations};
pub use crate::workflow::{ContextData, Handler, PipelineControl, PipelineResult, SkipCondition, StepDef};
