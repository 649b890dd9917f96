//! Port traits defined in `courtbook-core` and implemented by other crates.

pub mod gateway;
pub mod notifier;

pub use gateway::{GatewayPaymentStatus, InitiateRequest, InitiatedPayment, PaymentGateway, VerifiedPayment};
pub use notifier::{NotificationCategory, NotificationPort, Notice};
