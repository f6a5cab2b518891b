use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request for a payment or checkout session. `amount` is always in minor
/// currency units (paise, cents).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Response of `POST /api/payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub session_id: String,
    pub session_url: String,
    pub payment_id: String,
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
}

/// Response of `POST /api/stripe/create-checkout-session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
    pub client_secret: String,
}

/// What the client keeps after a session was created.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHandle {
    pub session_id: String,
    pub redirect_url: Option<String>,
    pub client_secret: Option<String>,
    pub payment_id: Option<String>,
}

impl SessionHandle {
    pub fn has_redirect_target(&self) -> bool {
        self.redirect_url.as_deref().is_some_and(|u| !u.is_empty())
            || self.client_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl From<PaymentSession> for SessionHandle {
    fn from(session: PaymentSession) -> Self {
        Self {
            session_id: session.session_id,
            redirect_url: Some(session.session_url),
            client_secret: None,
            payment_id: Some(session.payment_id),
        }
    }
}

impl From<CheckoutSession> for SessionHandle {
    fn from(session: CheckoutSession) -> Self {
        Self {
            session_id: session.id,
            redirect_url: Some(session.url),
            client_secret: Some(session.client_secret),
            payment_id: None,
        }
    }
}
