use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{ApiResponse, Booking, BookingRequest};
use crate::services::pricing::to_minor_units;
use crate::state::AppState;

// POST /api/bookings
//
// Stub endpoint: no conflict or inventory check, every request is accepted.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), AppError> {
    to_minor_units(request.total_price)?;
    let booking = Booking::from_request(Uuid::new_v4().to_string(), request, Utc::now());

    {
        let db = state.conn()?;
        queries::create_booking(&db, &booking)?;
    }

    tracing::info!(
        booking_id = %booking.id,
        product_id = %booking.product_id,
        total = %booking.total_price,
        "booking created"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(booking))))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let booking = {
        let db = state.conn()?;
        queries::get_booking(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    Ok(Json(ApiResponse::ok(booking)))
}
