//! Client side of checkout: book first, then open a payment session.

pub mod http;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::errors::ValidationError;
use crate::models::{
    Booking, BookingRequest, PaymentSessionRequest, PriceBreakdown, RentalQuote, SessionHandle,
};
use crate::services::booking::build_booking_request;
use crate::services::pricing::{compute_breakdown, to_minor_units};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("network error: {0}")]
    Network(String),

    #[error("booking rejected: {0}")]
    BookingRejected(String),

    #[error("payment session error: {0}")]
    PaymentSession(String),

    #[error("checkout cannot proceed while {0}")]
    InvalidState(&'static str),
}

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, CheckoutError>;

    async fn create_payment_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<SessionHandle, CheckoutError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductMeta {
    pub id: String,
    pub name: String,
}

/// Open a payment session for a booking. The amount is sent in minor units.
pub async fn submit_for_payment<G: CheckoutGateway + ?Sized>(
    gateway: &G,
    breakdown: &PriceBreakdown,
    booking: &Booking,
    product: &ProductMeta,
    currency: &str,
) -> Result<SessionHandle, CheckoutError> {
    let amount = to_minor_units(breakdown.total)?;

    let mut metadata = BTreeMap::new();
    metadata.insert("bookingId".to_string(), booking.id.clone());
    metadata.insert("productId".to_string(), product.id.clone());
    metadata.insert("productName".to_string(), product.name.clone());
    metadata.insert("rentalDays".to_string(), breakdown.days.to_string());
    metadata.insert("endUser".to_string(), booking.end_user.clone());

    let request = PaymentSessionRequest {
        booking_id: Some(booking.id.clone()),
        product_id: Some(product.id.clone()),
        amount,
        currency: Some(currency.to_string()),
        metadata,
    };

    let handle = gateway.create_payment_session(&request).await?;
    if !handle.has_redirect_target() {
        return Err(CheckoutError::PaymentSession(
            "payment session response carried no redirect target".to_string(),
        ));
    }
    Ok(handle)
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    Idle,
    QuoteEditing,
    SubmittingBooking,
    SubmittingPayment,
    Redirected { url: String },
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::QuoteEditing => "quote_editing",
            CheckoutState::SubmittingBooking => "submitting_booking",
            CheckoutState::SubmittingPayment => "submitting_payment",
            CheckoutState::Redirected { .. } => "redirected",
        }
    }
}

/// One checkout attempt for one product and buyer.
///
/// Failures put the flow back into `QuoteEditing` with the message kept for
/// display. Nothing is retried automatically.
pub struct CheckoutFlow<G> {
    gateway: G,
    product: ProductMeta,
    buyer: String,
    currency: String,
    state: CheckoutState,
    quote: Option<RentalQuote>,
    breakdown: Option<PriceBreakdown>,
    last_error: Option<String>,
}

impl<G: CheckoutGateway> CheckoutFlow<G> {
    pub fn new(gateway: G, product: ProductMeta, buyer: &str, currency: &str) -> Self {
        Self {
            gateway,
            product,
            buyer: buyer.to_string(),
            currency: currency.to_string(),
            state: CheckoutState::Idle,
            quote: None,
            breakdown: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn breakdown(&self) -> Option<&PriceBreakdown> {
        self.breakdown.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Replace the quote and recompute the price shown to the user.
    pub fn edit_quote(&mut self, quote: RentalQuote) -> Result<PriceBreakdown, CheckoutError> {
        match self.state {
            CheckoutState::Idle | CheckoutState::QuoteEditing => {}
            _ => return Err(CheckoutError::InvalidState(self.state.as_str())),
        }

        let breakdown = compute_breakdown(&quote)?;
        self.quote = Some(quote);
        self.breakdown = Some(breakdown);
        self.last_error = None;
        self.state = CheckoutState::QuoteEditing;
        Ok(breakdown)
    }

    pub async fn submit(&mut self) -> Result<SessionHandle, CheckoutError> {
        let (quote, breakdown) = match (&self.state, &self.quote, &self.breakdown) {
            (CheckoutState::QuoteEditing, Some(quote), Some(breakdown)) => (quote.clone(), *breakdown),
            _ => return Err(CheckoutError::InvalidState(self.state.as_str())),
        };

        let request = match build_booking_request(&quote, &breakdown, &self.product.id, &self.buyer) {
            Ok(request) => request,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.state = CheckoutState::SubmittingBooking;
        tracing::info!(product_id = %self.product.id, total = %breakdown.total, "submitting booking");
        let result = self.gateway.create_booking(&request).await;
        let booking = match result {
            Ok(booking) => booking,
            Err(e) => return Err(self.fail(e)),
        };

        self.state = CheckoutState::SubmittingPayment;
        tracing::info!(booking_id = %booking.id, "requesting payment session");
        let result = submit_for_payment(
            &self.gateway,
            &breakdown,
            &booking,
            &self.product,
            &self.currency,
        )
        .await;
        let handle = match result {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail(e)),
        };

        let url = handle.redirect_url.clone().unwrap_or_default();
        self.state = CheckoutState::Redirected { url };
        Ok(handle)
    }

    fn fail(&mut self, err: CheckoutError) -> CheckoutError {
        tracing::warn!(error = %err, state = self.state.as_str(), "checkout step failed");
        self.state = CheckoutState::QuoteEditing;
        self.last_error = Some(err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::models::BookingStatus;

    #[derive(Default)]
    struct MockGateway {
        bookings: Mutex<Vec<BookingRequest>>,
        payments: Mutex<Vec<PaymentSessionRequest>>,
        booking_error: Option<CheckoutError>,
        payment_error: Option<CheckoutError>,
        omit_redirect: bool,
    }

    #[async_trait]
    impl CheckoutGateway for MockGateway {
        async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, CheckoutError> {
            self.bookings.lock().unwrap().push(request.clone());
            if let Some(err) = &self.booking_error {
                return Err(err.clone());
            }
            Ok(Booking::from_request("bk-1".to_string(), request.clone(), Utc::now()))
        }

        async fn create_payment_session(
            &self,
            request: &PaymentSessionRequest,
        ) -> Result<SessionHandle, CheckoutError> {
            self.payments.lock().unwrap().push(request.clone());
            if let Some(err) = &self.payment_error {
                return Err(err.clone());
            }
            Ok(SessionHandle {
                session_id: "cs_test_1".to_string(),
                redirect_url: (!self.omit_redirect).then(|| "https://pay.example/cs_test_1".to_string()),
                client_secret: None,
                payment_id: Some("pay_1".to_string()),
            })
        }
    }

    fn product() -> ProductMeta {
        ProductMeta {
            id: "p-001".to_string(),
            name: "Camera".to_string(),
        }
    }

    fn quote(price: Decimal, start: u32, end: u32, quantity: u32) -> RentalQuote {
        RentalQuote {
            daily_price: price,
            start_date: NaiveDate::from_ymd_opt(2024, 1, start).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, end).unwrap(),
            quantity,
        }
    }

    fn flow(gateway: MockGateway) -> CheckoutFlow<MockGateway> {
        CheckoutFlow::new(gateway, product(), "user-7", "inr")
    }

    #[tokio::test]
    async fn test_happy_path_redirects() {
        let mut flow = flow(MockGateway::default());
        assert_eq!(flow.state(), &CheckoutState::Idle);

        let breakdown = flow.edit_quote(quote(dec!(100), 1, 4, 1)).unwrap();
        assert_eq!(breakdown.total, dec!(354.00));
        assert_eq!(flow.state(), &CheckoutState::QuoteEditing);

        let handle = flow.submit().await.unwrap();
        assert_eq!(handle.session_id, "cs_test_1");
        assert_eq!(
            flow.state(),
            &CheckoutState::Redirected {
                url: "https://pay.example/cs_test_1".to_string()
            }
        );

        let bookings = flow.gateway().bookings.lock().unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].total_price, dec!(354.00));
        assert_eq!(bookings[0].end_user, "user-7");

        let payments = flow.gateway().payments.lock().unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount, 35400);
        assert_eq!(payments[0].booking_id.as_deref(), Some("bk-1"));
        assert_eq!(payments[0].currency.as_deref(), Some("inr"));
        assert_eq!(payments[0].metadata["rentalDays"], "3");
    }

    #[test]
    fn test_overflowing_quote_is_rejected_without_changing_state() {
        let mut flow = flow(MockGateway::default());

        let err = flow.edit_quote(quote(Decimal::MAX, 1, 2, 2)).unwrap_err();
        assert_eq!(err, CheckoutError::Validation(ValidationError::AmountOutOfRange));
        assert_eq!(flow.state(), &CheckoutState::Idle);
        assert!(flow.breakdown().is_none());

        let breakdown = flow.edit_quote(quote(dec!(100), 1, 2, 2)).unwrap();
        assert_eq!(breakdown.total, dec!(236.00));
    }

    #[tokio::test]
    async fn test_invalid_date_range_never_reaches_gateway() {
        let mut flow = flow(MockGateway::default());
        flow.edit_quote(quote(dec!(100), 4, 4, 1)).unwrap();

        let err = flow.submit().await.unwrap_err();
        assert_eq!(err, CheckoutError::Validation(ValidationError::InvalidDateRange));
        assert_eq!(flow.state(), &CheckoutState::QuoteEditing);
        assert!(flow.last_error().is_some());
        assert!(flow.gateway().bookings.lock().unwrap().is_empty());
        assert!(flow.gateway().payments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_booking_failure_returns_to_editing_without_payment() {
        let gateway = MockGateway {
            booking_error: Some(CheckoutError::Network("connection refused".to_string())),
            ..Default::default()
        };
        let mut flow = flow(gateway);
        flow.edit_quote(quote(dec!(50), 1, 2, 2)).unwrap();

        let err = flow.submit().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Network(_)));
        assert_eq!(flow.state(), &CheckoutState::QuoteEditing);
        assert_eq!(flow.last_error(), Some("network error: connection refused"));
        assert_eq!(flow.gateway().bookings.lock().unwrap().len(), 1);
        assert!(flow.gateway().payments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payment_failure_is_not_retried() {
        let gateway = MockGateway {
            payment_error: Some(CheckoutError::PaymentSession("card declined".to_string())),
            ..Default::default()
        };
        let mut flow = flow(gateway);
        flow.edit_quote(quote(dec!(50), 1, 2, 2)).unwrap();

        let err = flow.submit().await.unwrap_err();
        assert_eq!(err, CheckoutError::PaymentSession("card declined".to_string()));
        assert_eq!(flow.state(), &CheckoutState::QuoteEditing);
        assert_eq!(flow.gateway().payments.lock().unwrap().len(), 1);

        // editing again clears the error; the user may retry by hand
        flow.edit_quote(quote(dec!(50), 1, 3, 2)).unwrap();
        assert!(flow.last_error().is_none());
    }

    #[tokio::test]
    async fn test_missing_redirect_target_is_a_payment_error() {
        let gateway = MockGateway {
            omit_redirect: true,
            ..Default::default()
        };
        let mut flow = flow(gateway);
        flow.edit_quote(quote(dec!(100), 1, 4, 1)).unwrap();

        let err = flow.submit().await.unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentSession(_)));
        assert_eq!(flow.state(), &CheckoutState::QuoteEditing);
    }

    #[tokio::test]
    async fn test_submit_requires_a_quote() {
        let mut flow = flow(MockGateway::default());
        let err = flow.submit().await.unwrap_err();
        assert_eq!(err, CheckoutError::InvalidState("idle"));
    }

    #[tokio::test]
    async fn test_no_edits_after_redirect() {
        let mut flow = flow(MockGateway::default());
        flow.edit_quote(quote(dec!(100), 1, 4, 1)).unwrap();
        flow.submit().await.unwrap();

        let err = flow.edit_quote(quote(dec!(100), 1, 5, 1)).unwrap_err();
        assert_eq!(err, CheckoutError::InvalidState("redirected"));
    }

    #[tokio::test]
    async fn test_submit_for_payment_converts_once_to_minor_units() {
        let gateway = MockGateway::default();
        let booking = Booking {
            id: "bk-9".to_string(),
            product_id: "p-001".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            total_price: dec!(33.335),
            end_user: "user-7".to_string(),
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        let breakdown = PriceBreakdown {
            days: 1,
            subtotal: dec!(28.25),
            tax: dec!(5.085),
            total: dec!(33.335),
        };

        submit_for_payment(&gateway, &breakdown, &booking, &product(), "inr")
            .await
            .unwrap();
        assert_eq!(gateway.payments.lock().unwrap()[0].amount, 3334);
    }
}
