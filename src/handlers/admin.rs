use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::{AppError, ValidationError};
use crate::models::{ApiResponse, Booking, BookingStatus, NewProduct, Product, ProductUpdate};
use crate::services::pricing::to_minor_units;
use crate::services::reports::ReportExporter;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn validate_product(product: &Product) -> Result<(), ValidationError> {
    if product.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if product.category.trim().is_empty() {
        return Err(ValidationError::MissingField("category"));
    }
    if product.price <= Decimal::ZERO {
        return Err(ValidationError::InvalidPrice);
    }
    to_minor_units(product.price)?;
    Ok(())
}

// GET /api/admin/stats
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    products: i64,
    bookings: i64,
    pending_bookings: i64,
    confirmed_bookings: i64,
    cancelled_bookings: i64,
    #[serde(with = "rust_decimal::serde::float")]
    revenue: Decimal,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<StatsResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let stats = {
        let db = state.conn()?;
        queries::get_dashboard_stats(&db)?
    };

    Ok(Json(ApiResponse::ok(StatsResponse {
        products: stats.products,
        bookings: stats.bookings,
        pending_bookings: stats.pending,
        confirmed_bookings: stats.confirmed,
        cancelled_bookings: stats.cancelled,
        revenue: stats.revenue,
    })))
}

// POST /api/admin/products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let product = Product {
        id: format!("p-{}", Uuid::new_v4().simple()),
        name: body.name.trim().to_string(),
        description: body.description,
        category: body.category.trim().to_string(),
        price: body.price,
        image_url: body.image_url,
        location: body.location,
        is_available: body.is_available,
        created_at: Utc::now(),
    };
    validate_product(&product)?;

    {
        let db = state.conn()?;
        queries::insert_product(&db, &product)?;
    }
    tracing::info!(product_id = %product.id, name = %product.name, "product created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(product))))
}

// PUT /api/admin/products/:id
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ProductUpdate>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.conn()?;
    let mut product = queries::get_product(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    body.apply(&mut product);
    validate_product(&product)?;
    queries::update_product(&db, &product)?;
    tracing::info!(product_id = %product.id, "product updated");

    Ok(Json(ApiResponse::ok(product)))
}

// DELETE /api/admin/products/:id
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let removed = {
        let db = state.conn()?;
        queries::delete_product(&db, &id)?
    };

    if !removed {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    tracing::info!(product_id = %id, "product deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            BookingStatus::parse(s).ok_or_else(|| ValidationError::InvalidStatus(s.to_string()))?,
        ),
        None => None,
    };
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    let bookings = {
        let db = state.conn()?;
        queries::list_bookings(&db, status, limit)?
    };

    Ok(Json(ApiResponse::ok(bookings)))
}

fn set_booking_status(state: &AppState, id: &str, status: BookingStatus) -> Result<Booking, AppError> {
    let db = state.conn()?;
    if !queries::update_booking_status(&db, id, status)? {
        return Err(AppError::NotFound(format!("booking {id}")));
    }
    tracing::info!(booking_id = %id, status = status.as_str(), "booking status changed");
    queries::get_booking(&db, id)?.ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

// POST /api/admin/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let booking = set_booking_status(&state, &id, BookingStatus::Confirmed)?;
    Ok(Json(ApiResponse::ok(booking)))
}

// POST /api/admin/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let booking = set_booking_status(&state, &id, BookingStatus::Cancelled)?;
    Ok(Json(ApiResponse::ok(booking)))
}

// POST /api/admin/reports
#[derive(Serialize)]
pub struct ReportsResponse {
    files: Vec<String>,
}

pub async fn export_reports(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ReportsResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let (bookings, products) = {
        let db = state.conn()?;
        (queries::all_bookings(&db)?, queries::all_products(&db)?)
    };

    let paths = ReportExporter::new(&state.config.uploads_dir).export_all(&bookings, &products)?;

    Ok(Json(ApiResponse::ok(ReportsResponse {
        files: paths.iter().map(|p| p.display().to_string()).collect(),
    })))
}
