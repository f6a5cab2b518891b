pub mod admin;
pub mod bookings;
pub mod health;
pub mod payments;
pub mod products;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/products", get(products::list_products))
        .route(
            "/api/products/availability/:id",
            get(products::check_availability),
        )
        .route("/api/products/:id", get(products::get_product))
        .route("/api/quotes", post(products::quote))
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route("/api/payments", post(payments::create_payment))
        .route(
            "/api/stripe/create-checkout-session",
            post(payments::create_checkout_session),
        )
        .route("/api/admin/stats", get(admin::get_stats))
        .route("/api/admin/products", post(admin::create_product))
        .route(
            "/api/admin/products/:id",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/api/admin/bookings", get(admin::get_bookings))
        .route(
            "/api/admin/bookings/:id/confirm",
            post(admin::confirm_booking),
        )
        .route(
            "/api/admin/bookings/:id/cancel",
            post(admin::cancel_booking),
        )
        .route("/api/admin/reports", post(admin::export_reports))
        .with_state(state)
}
