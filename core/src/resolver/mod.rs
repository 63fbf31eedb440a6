pub mod payment;
pub mod shipping;

pub use payment::{ConfiguredPaymentMethodsResolver, PaymentMethod, PaymentMethodsResolver};
pub use shipping::{ConfiguredShippingMethodsResolver, ShippingMethod, ShippingMethodsResolver};
