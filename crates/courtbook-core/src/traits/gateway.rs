//! Payment gateway port.
//!
//! The gateway is a pure request/response collaborator: `initiate` opens a
//! payment and returns a redirect URL, `verify` looks up the authoritative
//! outcome by the opaque `pidx` reference. The adapter holds no state and
//! is never retried silently; callers decide what a failure means for the
//! reservation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Payment status reported by the gateway lookup endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewayPaymentStatus {
    /// Payment completed successfully.
    Completed,
    /// Payment is still pending on the gateway side.
    Pending,
    /// Payment was initiated but never finished.
    Initiated,
    /// Payment was refunded.
    Refunded,
    /// The payment window expired.
    Expired,
    /// The customer cancelled the payment.
    UserCanceled,
}

impl GatewayPaymentStatus {
    /// Whether this status settles the payment successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Return the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Initiated => "initiated",
            Self::Refunded => "refunded",
            Self::Expired => "expired",
            Self::UserCanceled => "user_canceled",
        }
    }
}

impl std::fmt::Display for GatewayPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request to open a payment with the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateRequest {
    /// Merchant-side order reference (unique per reservation attempt).
    pub order_id: String,
    /// Human-readable order description shown on the payment page.
    pub order_name: String,
    /// Amount in integer minor currency units.
    pub amount_minor: i64,
    /// URL the customer is redirected back to after paying.
    pub return_url: String,
    /// Customer display name, if known.
    pub customer_name: Option<String>,
}

/// A successfully initiated payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatedPayment {
    /// Opaque gateway reference correlating initiate and verify calls.
    pub pidx: String,
    /// URL the customer must visit to complete the payment.
    pub payment_url: String,
}

/// The authoritative payment outcome reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedPayment {
    /// Gateway-side payment status.
    pub status: GatewayPaymentStatus,
    /// Amount the gateway actually processed, in minor units.
    pub amount_minor: i64,
    /// Gateway transaction identifier, once one exists.
    pub transaction_id: Option<String>,
}

/// Trait for the external payment gateway.
///
/// Implementations must bound each call with a timeout so a hung gateway
/// never blocks a reservation indefinitely, and must not hold any lock
/// across the call.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Open a payment and obtain the customer redirect URL.
    async fn initiate(&self, request: InitiateRequest) -> AppResult<InitiatedPayment>;

    /// Look up the authoritative outcome of a payment by `pidx`.
    async fn verify(&self, pidx: &str) -> AppResult<VerifiedPayment>;
}
