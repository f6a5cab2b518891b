use rust_decimal::Decimal;

use crate::errors::ValidationError;
use crate::models::{BookingRequest, PriceBreakdown, RentalQuote};

/// Validate a quote for submission and turn it into the booking payload.
///
/// Stricter than the calculator: the end date must fall after the start date.
pub fn build_booking_request(
    quote: &RentalQuote,
    breakdown: &PriceBreakdown,
    product_id: &str,
    buyer: &str,
) -> Result<BookingRequest, ValidationError> {
    if quote.quantity < 1 {
        return Err(ValidationError::InvalidQuantity);
    }
    if quote.end_date <= quote.start_date {
        return Err(ValidationError::InvalidDateRange);
    }
    if quote.daily_price <= Decimal::ZERO {
        return Err(ValidationError::InvalidPrice);
    }

    Ok(BookingRequest {
        product_id: product_id.to_string(),
        start_date: quote.start_date,
        end_date: quote.end_date,
        total_price: breakdown.total,
        end_user: buyer.to_string(),
    })
}
