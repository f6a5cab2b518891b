use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::json;

use rentals::config::AppConfig;
use rentals::db::{self, queries};
use rentals::handlers;
use rentals::models::{BookingRequest, PaymentSessionRequest, RentalQuote};
use rentals::services::checkout::http::HttpCheckoutGateway;
use rentals::services::checkout::{CheckoutError, CheckoutFlow, CheckoutGateway, CheckoutState, ProductMeta};
use rentals::state::AppState;

// ── Helpers ──

fn test_config(api_base_url: &str) -> AppConfig {
    AppConfig {
        port: 0,
        database_url: ":memory:".to_string(),
        admin_token: "test-token".to_string(),
        uploads_dir: PathBuf::from("uploads"),
        currency: "inr".to_string(),
        checkout_base_url: "https://checkout.test/pay".to_string(),
        api_base_url: api_base_url.to_string(),
        request_timeout: Duration::from_secs(5),
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_api() -> (String, Arc<AppState>) {
    let conn = db::init_db(":memory:").unwrap();
    let state = Arc::new(AppState::new(conn, test_config("")));
    let base_url = serve(handlers::router(state.clone())).await;
    (base_url, state)
}

fn quote(start: u32, end: u32) -> RentalQuote {
    RentalQuote {
        daily_price: dec!(100),
        start_date: NaiveDate::from_ymd_opt(2024, 1, start).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 1, end).unwrap(),
        quantity: 1,
    }
}

fn product() -> ProductMeta {
    ProductMeta {
        id: "p-001".to_string(),
        name: "Canon EOS R6 Camera Kit".to_string(),
    }
}

fn booking_request() -> BookingRequest {
    BookingRequest {
        product_id: "p-001".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        total_price: dec!(354),
        end_user: "user-42".to_string(),
    }
}

fn payment_request() -> PaymentSessionRequest {
    PaymentSessionRequest {
        booking_id: Some("bk-1".to_string()),
        product_id: None,
        amount: 35400,
        currency: None,
        metadata: Default::default(),
    }
}

// ── Tests ──

#[tokio::test]
async fn test_checkout_flow_against_live_api() {
    let (base_url, state) = spawn_api().await;
    let gateway = HttpCheckoutGateway::from_config(&test_config(&base_url)).unwrap();
    let mut flow = CheckoutFlow::new(gateway, product(), "user-42", "inr");

    let breakdown = flow.edit_quote(quote(1, 4)).unwrap();
    assert_eq!(breakdown.total, dec!(354.00));

    let handle = flow.submit().await.unwrap();
    assert!(handle.session_id.starts_with("cs_test_"));
    assert_eq!(
        handle.redirect_url.as_deref(),
        Some(format!("https://checkout.test/pay/{}", handle.session_id).as_str())
    );
    assert!(handle.payment_id.unwrap().starts_with("pay_"));
    assert!(matches!(flow.state(), CheckoutState::Redirected { .. }));

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::list_bookings(&db, None, 10).unwrap()
    };
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].total_price, dec!(354));
    assert_eq!(bookings[0].end_user, "user-42");
}

#[tokio::test]
async fn test_invalid_range_sends_nothing() {
    let (base_url, state) = spawn_api().await;
    let gateway = HttpCheckoutGateway::new(&base_url, Duration::from_secs(5)).unwrap();
    let mut flow = CheckoutFlow::new(gateway, product(), "user-42", "inr");

    flow.edit_quote(quote(4, 1)).unwrap();
    let err = flow.submit().await.unwrap_err();
    assert!(matches!(err, CheckoutError::Validation(_)));
    assert_eq!(flow.state(), &CheckoutState::QuoteEditing);

    let db = state.db.lock().unwrap();
    assert!(queries::list_bookings(&db, None, 10).unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_error_carries_server_message() {
    let app = Router::new().route(
        "/api/payments",
        post(|| async {
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "success": false, "message": "gateway unavailable" })),
            )
        }),
    );
    let base_url = serve(app).await;
    let gateway = HttpCheckoutGateway::new(&base_url, Duration::from_secs(5)).unwrap();

    let err = gateway.create_payment_session(&payment_request()).await.unwrap_err();
    assert_eq!(err, CheckoutError::PaymentSession("gateway unavailable".to_string()));
}

#[tokio::test]
async fn test_payment_error_without_body_uses_generic_message() {
    let app = Router::new().route(
        "/api/payments",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base_url = serve(app).await;
    let gateway = HttpCheckoutGateway::new(&base_url, Duration::from_secs(5)).unwrap();

    let err = gateway.create_payment_session(&payment_request()).await.unwrap_err();
    assert_eq!(
        err,
        CheckoutError::PaymentSession("unable to start payment, please try again".to_string())
    );
}

#[tokio::test]
async fn test_booking_rejection_is_reported() {
    let app = Router::new().route(
        "/api/bookings",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "success": false, "message": "product is archived" })),
            )
        }),
    );
    let base_url = serve(app).await;
    let gateway = HttpCheckoutGateway::new(&base_url, Duration::from_secs(5)).unwrap();

    let err = gateway.create_booking(&booking_request()).await.unwrap_err();
    assert_eq!(err, CheckoutError::BookingRejected("product is archived".to_string()));
}

#[tokio::test]
async fn test_slow_payment_endpoint_times_out() {
    let app = Router::new().route(
        "/api/payments",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            StatusCode::OK
        }),
    );
    let base_url = serve(app).await;
    let gateway = HttpCheckoutGateway::new(&base_url, Duration::from_millis(200)).unwrap();

    let err = gateway.create_payment_session(&payment_request()).await.unwrap_err();
    assert_eq!(err, CheckoutError::Network("request timed out".to_string()));
}

#[tokio::test]
async fn test_unreachable_api_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = HttpCheckoutGateway::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let mut flow = CheckoutFlow::new(gateway, product(), "user-42", "inr");
    flow.edit_quote(quote(1, 4)).unwrap();

    let err = flow.submit().await.unwrap_err();
    assert!(matches!(err, CheckoutError::Network(_)));
    assert_eq!(flow.state(), &CheckoutState::QuoteEditing);
    assert!(flow.last_error().unwrap().starts_with("network error"));
}
