//! HTTP payment gateway adapter.
//!
//! Speaks the Khalti-style ePayment API: `initiate` opens a payment and
//! returns the hosted payment page URL, `lookup` reports the
//! authoritative outcome by `pidx`. Amounts are integer minor currency
//! units end to end.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use courtbook_core::config::gateway::GatewayConfig;
use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::traits::gateway::{
    GatewayPaymentStatus, InitiateRequest, InitiatedPayment, PaymentGateway, VerifiedPayment,
};

/// Gateway adapter over HTTP.
///
/// Each call is bounded by the configured timeout; a hung gateway
/// surfaces as a `Gateway` error instead of blocking the reservation.
/// The adapter holds no state beyond the client and configuration.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

#[derive(Serialize)]
struct InitiateBody<'a> {
    return_url: &'a str,
    amount: i64,
    purchase_order_id: &'a str,
    purchase_order_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_info: Option<CustomerInfo<'a>>,
}

#[derive(Serialize)]
struct CustomerInfo<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct InitiateResponse {
    pidx: String,
    payment_url: String,
}

#[derive(Serialize)]
struct LookupBody<'a> {
    pidx: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    status: String,
    total_amount: i64,
    transaction_id: Option<String>,
}

impl HttpPaymentGateway {
    /// Create an adapter from configuration.
    pub fn new(config: GatewayConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    courtbook_core::error::ErrorKind::Configuration,
                    "Failed to build gateway HTTP client",
                    e,
                )
            })?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn parse_status(raw: &str) -> AppResult<GatewayPaymentStatus> {
        match raw {
            "Completed" => Ok(GatewayPaymentStatus::Completed),
            "Pending" => Ok(GatewayPaymentStatus::Pending),
            "Initiated" => Ok(GatewayPaymentStatus::Initiated),
            "Refunded" => Ok(GatewayPaymentStatus::Refunded),
            "Expired" => Ok(GatewayPaymentStatus::Expired),
            "User canceled" => Ok(GatewayPaymentStatus::UserCanceled),
            other => Err(AppError::gateway(format!(
                "Unknown gateway payment status '{other}'"
            ))),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn initiate(&self, request: InitiateRequest) -> AppResult<InitiatedPayment> {
        let body = InitiateBody {
            return_url: &request.return_url,
            amount: request.amount_minor,
            purchase_order_id: &request.order_id,
            purchase_order_name: &request.order_name,
            customer_info: request
                .customer_name
                .as_deref()
                .map(|name| CustomerInfo { name }),
        };

        let response = self
            .client
            .post(self.endpoint("epayment/initiate/"))
            .header("Authorization", format!("key {}", self.config.secret_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::with_source(
                courtbook_core::error::ErrorKind::Gateway,
                "Gateway initiate request failed",
                e,
            ))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::gateway(format!(
                "Gateway initiate returned {status}: {text}"
            )));
        }

        let parsed: InitiateResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                courtbook_core::error::ErrorKind::Gateway,
                "Gateway initiate returned an unreadable body",
                e,
            )
        })?;

        debug!(pidx = %parsed.pidx, order_id = %request.order_id, "Payment initiated");
        Ok(InitiatedPayment {
            pidx: parsed.pidx,
            payment_url: parsed.payment_url,
        })
    }

    async fn verify(&self, pidx: &str) -> AppResult<VerifiedPayment> {
        let response = self
            .client
            .post(self.endpoint("epayment/lookup/"))
            .header("Authorization", format!("key {}", self.config.secret_key))
            .json(&LookupBody { pidx })
            .send()
            .await
            .map_err(|e| AppError::with_source(
                courtbook_core::error::ErrorKind::Gateway,
                "Gateway lookup request failed",
                e,
            ))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::gateway(format!(
                "Gateway lookup returned {status}: {text}"
            )));
        }

        let parsed: LookupResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                courtbook_core::error::ErrorKind::Gateway,
                "Gateway lookup returned an unreadable body",
                e,
            )
        })?;

        Ok(VerifiedPayment {
            status: Self::parse_status(&parsed.status)?,
            amount_minor: parsed.total_amount,
            transaction_id: parsed.transaction_id,
        })
    }
}
