use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::{AppError, ValidationError};
use crate::models::{CheckoutSession, PaymentSession, PaymentSessionRequest};
use crate::state::AppState;

/// Synthetic session id; no payment provider is contacted.
fn session_id() -> String {
    format!("cs_test_{}", Utc::now().timestamp_millis())
}

fn session_url(state: &AppState, session_id: &str) -> String {
    format!(
        "{}/{session_id}",
        state.config.checkout_base_url.trim_end_matches('/')
    )
}

fn currency(state: &AppState, request: &PaymentSessionRequest) -> String {
    request
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| state.config.currency.clone())
}

fn validate(request: &PaymentSessionRequest) -> Result<(), ValidationError> {
    if request.amount <= 0 {
        return Err(ValidationError::InvalidAmount);
    }
    Ok(())
}

// POST /api/payments
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PaymentSessionRequest>,
) -> Result<Json<PaymentSession>, AppError> {
    validate(&request)?;

    let session_id = session_id();
    let session = PaymentSession {
        session_url: session_url(&state, &session_id),
        payment_id: format!("pay_{}", Uuid::new_v4().simple()),
        amount: request.amount,
        currency: currency(&state, &request),
        payment_method: "card".to_string(),
        session_id,
    };

    tracing::info!(
        session_id = %session.session_id,
        booking_id = ?request.booking_id,
        amount = session.amount,
        currency = %session.currency,
        "payment session created"
    );

    Ok(Json(session))
}

// POST /api/stripe/create-checkout-session
pub async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PaymentSessionRequest>,
) -> Result<Json<CheckoutSession>, AppError> {
    validate(&request)?;

    let id = session_id();
    let session = CheckoutSession {
        url: session_url(&state, &id),
        client_secret: format!("{id}_secret_{}", Uuid::new_v4().simple()),
        id,
    };

    tracing::info!(
        session_id = %session.id,
        product_id = ?request.product_id,
        amount = request.amount,
        "checkout session created"
    );

    Ok(Json(session))
}
