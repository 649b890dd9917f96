//! Payment gateway adapters.

pub mod http;

pub use http::HttpPaymentGateway;
