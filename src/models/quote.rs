use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What the renter is currently looking at on the checkout screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalQuote {
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_price: Decimal,
    #[serde(with = "super::date")]
    pub start_date: NaiveDate,
    #[serde(with = "super::date")]
    pub end_date: NaiveDate,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub days: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Body of `POST /api/quotes`; the daily price comes from the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub product_id: String,
    #[serde(with = "super::date")]
    pub start_date: NaiveDate,
    #[serde(with = "super::date")]
    pub end_date: NaiveDate,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
