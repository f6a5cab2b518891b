pub mod booking;
pub mod checkout;
pub mod pricing;
pub mod reports;
