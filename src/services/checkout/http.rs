use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use super::{CheckoutError, CheckoutGateway};
use crate::config::AppConfig;
use crate::models::{ApiResponse, Booking, BookingRequest, PaymentSession, PaymentSessionRequest, SessionHandle};

/// Talks to the rental API over HTTP. Every request is bounded by the client timeout.
pub struct HttpCheckoutGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCheckoutGateway {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout)
    }
}

fn network_error(err: reqwest::Error) -> CheckoutError {
    if err.is_timeout() {
        CheckoutError::Network("request timed out".to_string())
    } else {
        CheckoutError::Network(err.to_string())
    }
}

/// The `message` field of a `{ success: false, message }` body, if any.
async fn server_message(resp: reqwest::Response) -> Option<String> {
    let body: serde_json::Value = resp.json().await.ok()?;
    body["message"]
        .as_str()
        .filter(|m| !m.is_empty())
        .map(|m| m.to_string())
}

#[async_trait]
impl CheckoutGateway for HttpCheckoutGateway {
    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, CheckoutError> {
        let resp = self
            .client
            .post(format!("{}/api/bookings", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        let status = resp.status();
        if !status.is_success() {
            let message = server_message(resp)
                .await
                .unwrap_or_else(|| format!("booking request failed ({status})"));
            tracing::warn!(%status, message = %message, "booking rejected");
            return Err(CheckoutError::BookingRejected(message));
        }

        let body: ApiResponse<Booking> = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                network_error(e)
            } else {
                CheckoutError::BookingRejected(format!("unreadable booking response: {e}"))
            }
        })?;
        Ok(body.data)
    }

    async fn create_payment_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<SessionHandle, CheckoutError> {
        let resp = self
            .client
            .post(format!("{}/api/payments", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        let status = resp.status();
        if !status.is_success() {
            let message = server_message(resp)
                .await
                .unwrap_or_else(|| "unable to start payment, please try again".to_string());
            tracing::warn!(%status, message = %message, "payment session rejected");
            return Err(CheckoutError::PaymentSession(message));
        }

        let session: PaymentSession = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                network_error(e)
            } else {
                CheckoutError::PaymentSession(format!("unreadable payment response: {e}"))
            }
        })?;
        Ok(session.into())
    }
}
