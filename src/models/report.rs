use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::services::pricing::round2;

/// A row type that can be written to a CSV report.
pub trait ReportRow {
    const FILE_NAME: &'static str;
    /// Field key to column title, in column order.
    const COLUMNS: &'static [(&'static str, &'static str)];

    /// Formatted value for one field key, `None` for an unknown key.
    fn field(&self, key: &str) -> Option<String>;

    fn header() -> Vec<&'static str> {
        Self::COLUMNS.iter().map(|(_, title)| *title).collect()
    }

    /// One CSV record, ordered by `COLUMNS`.
    fn record(&self) -> Vec<String> {
        Self::COLUMNS
            .iter()
            .map(|(key, _)| self.field(key).unwrap_or_default())
            .collect()
    }
}

pub fn money(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// en-US locale date string, e.g. `1/4/2024`.
pub fn locale_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[derive(Debug, Clone)]
pub struct BookingRow {
    pub booking_id: String,
    pub product_name: String,
    pub customer: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: String,
    pub booked_on: NaiveDate,
}

impl ReportRow for BookingRow {
    const FILE_NAME: &'static str = "bookings_report.csv";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("bookingId", "Booking ID"),
        ("productName", "Product"),
        ("customer", "Customer"),
        ("startDate", "Start Date"),
        ("endDate", "End Date"),
        ("totalPrice", "Total Price"),
        ("status", "Status"),
        ("bookedOn", "Booked On"),
    ];

    fn field(&self, key: &str) -> Option<String> {
        let value = match key {
            "bookingId" => self.booking_id.clone(),
            "productName" => self.product_name.clone(),
            "customer" => self.customer.clone(),
            "startDate" => locale_date(self.start_date),
            "endDate" => locale_date(self.end_date),
            "totalPrice" => money(self.total_price),
            "status" => self.status.clone(),
            "bookedOn" => locale_date(self.booked_on),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone)]
pub struct RevenueRow {
    pub date: NaiveDate,
    pub bookings: u64,
    pub revenue: Decimal,
}

impl ReportRow for RevenueRow {
    const FILE_NAME: &'static str = "revenue_report.csv";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("date", "Date"),
        ("bookings", "Bookings"),
        ("revenue", "Revenue"),
    ];

    fn field(&self, key: &str) -> Option<String> {
        let value = match key {
            "date" => locale_date(self.date),
            "bookings" => self.bookings.to_string(),
            "revenue" => money(self.revenue),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone)]
pub struct ProductRow {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub daily_price: Decimal,
    pub bookings: u64,
    pub revenue: Decimal,
}

impl ReportRow for ProductRow {
    const FILE_NAME: &'static str = "product_report.csv";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("productId", "Product ID"),
        ("name", "Product Name"),
        ("category", "Category"),
        ("dailyPrice", "Daily Price"),
        ("bookings", "Bookings"),
        ("revenue", "Revenue"),
    ];

    fn field(&self, key: &str) -> Option<String> {
        let value = match key {
            "productId" => self.product_id.clone(),
            "name" => self.name.clone(),
            "category" => self.category.clone(),
            "dailyPrice" => money(self.daily_price),
            "bookings" => self.bookings.to_string(),
            "revenue" => money(self.revenue),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone)]
pub struct CustomerRow {
    pub customer: String,
    pub bookings: u64,
    pub total_spent: Decimal,
    pub last_booking: NaiveDate,
}

impl ReportRow for CustomerRow {
    const FILE_NAME: &'static str = "customer_report.csv";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("customer", "Customer"),
        ("bookings", "Bookings"),
        ("totalSpent", "Total Spent"),
        ("lastBooking", "Last Booking"),
    ];

    fn field(&self, key: &str) -> Option<String> {
        let value = match key {
            "customer" => self.customer.clone(),
            "bookings" => self.bookings.to_string(),
            "totalSpent" => money(self.total_spent),
            "lastBooking" => locale_date(self.last_booking),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_pads_to_two_decimals() {
        assert_eq!(money(dec!(354)), "354.00");
        assert_eq!(money(dec!(18.5)), "18.50");
        assert_eq!(money(dec!(33.335)), "33.34");
    }

    #[test]
    fn test_locale_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        assert_eq!(locale_date(date), "1/4/2024");
        let date = NaiveDate::from_ymd_opt(2024, 11, 23).unwrap();
        assert_eq!(locale_date(date), "11/23/2024");
    }

    fn assert_every_key_resolves<R: ReportRow>(row: &R) {
        for (key, title) in R::COLUMNS {
            assert!(row.field(key).is_some(), "{} has no value for {key} ({title})", R::FILE_NAME);
        }
        assert!(row.field("nope").is_none());
    }

    #[test]
    fn test_every_column_key_has_a_field() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let booking = BookingRow {
            booking_id: "bk-1".into(),
            product_name: "Tent".into(),
            customer: "user-1".into(),
            start_date: day,
            end_date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            total_price: dec!(118),
            status: "pending".into(),
            booked_on: day,
        };
        assert_every_key_resolves(&booking);
        assert_eq!(
            booking.record(),
            vec!["bk-1", "Tent", "user-1", "1/4/2024", "1/6/2024", "118.00", "pending", "1/4/2024"]
        );

        let revenue = RevenueRow { date: day, bookings: 2, revenue: dec!(236) };
        assert_every_key_resolves(&revenue);
        assert_eq!(revenue.record(), vec!["1/4/2024", "2", "236.00"]);
        assert_eq!(RevenueRow::header(), vec!["Date", "Bookings", "Revenue"]);

        let product = ProductRow {
            product_id: "p-003".into(),
            name: "Tent".into(),
            category: "Outdoor".into(),
            daily_price: dec!(400),
            bookings: 1,
            revenue: dec!(472),
        };
        assert_every_key_resolves(&product);
        assert_eq!(product.record(), vec!["p-003", "Tent", "Outdoor", "400.00", "1", "472.00"]);

        let customer = CustomerRow {
            customer: "user-1".into(),
            bookings: 1,
            total_spent: dec!(118),
            last_booking: day,
        };
        assert_every_key_resolves(&customer);
        assert_eq!(customer.record(), vec!["user-1", "1", "118.00", "1/4/2024"]);
    }
}
