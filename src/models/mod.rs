pub mod booking;
pub mod date;
pub mod payment;
pub mod product;
pub mod quote;
pub mod report;
pub mod response;

pub use booking::{Booking, BookingRequest, BookingStatus};
pub use payment::{CheckoutSession, PaymentSession, PaymentSessionRequest, SessionHandle};
pub use product::{NewProduct, Product, ProductFilter, ProductPage, ProductSort, ProductUpdate};
pub use quote::{PriceBreakdown, QuoteRequest, RentalQuote};
pub use report::{BookingRow, CustomerRow, ProductRow, ReportRow, RevenueRow};
pub use response::{ApiResponse, Availability, ProductList};
