use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payload the checkout sends to `POST /api/bookings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub product_id: String,
    #[serde(with = "super::date")]
    pub start_date: NaiveDate,
    #[serde(with = "super::date")]
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub end_user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub product_id: String,
    #[serde(with = "super::date")]
    pub start_date: NaiveDate,
    #[serde(with = "super::date")]
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub end_user: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_request(id: String, request: BookingRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            product_id: request.product_id,
            start_date: request.start_date,
            end_date: request.end_date,
            total_price: request.total_price,
            end_user: request.end_user,
            status: BookingStatus::Pending,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}
