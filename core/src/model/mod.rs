pub mod address;
pub mod catalog;
pub mod channel;
pub mod customer;
pub mod order;

pub use address::Address;
pub use catalog::{Product, ProductCatalog};
pub use channel::{Channel, ChannelCode, ChannelRegistry};
pub use customer::{CustomerId, CustomerProvider, CustomerRef, Email, EmailError, Principal};
pub use order::{
  CheckoutState, CompletionRequest, LineItem, Order, OrderToken, Payment, PaymentId, Shipment, ShipmentId,
};
