use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    Booking, BookingRow, BookingStatus, CustomerRow, Product, ProductRow, ReportRow, RevenueRow,
};

/// Writes the admin CSV reports into a fixed uploads directory.
pub struct ReportExporter {
    dir: PathBuf,
}

impl ReportExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write<R: ReportRow>(&self, rows: &[R]) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.dir.join(R::FILE_NAME);
        write_csv(&path, rows)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "wrote report");
        Ok(path)
    }

    /// All four reports from the current bookings and catalog.
    pub fn export_all(&self, bookings: &[Booking], products: &[Product]) -> anyhow::Result<Vec<PathBuf>> {
        Ok(vec![
            self.write(&booking_rows(bookings, products))?,
            self.write(&revenue_rows(bookings))?,
            self.write(&product_rows(bookings, products))?,
            self.write(&customer_rows(bookings))?,
        ])
    }
}

fn write_csv<R: ReportRow>(path: &Path, rows: &[R]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writer.write_record(R::header())?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    writer.flush()?;
    Ok(())
}

fn counts_toward_revenue(booking: &Booking) -> bool {
    booking.status != BookingStatus::Cancelled
}

pub fn booking_rows(bookings: &[Booking], products: &[Product]) -> Vec<BookingRow> {
    let names: HashMap<&str, &str> = products
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();

    bookings
        .iter()
        .map(|b| BookingRow {
            booking_id: b.id.clone(),
            product_name: names
                .get(b.product_id.as_str())
                .map(|n| n.to_string())
                .unwrap_or_else(|| b.product_id.clone()),
            customer: b.end_user.clone(),
            start_date: b.start_date,
            end_date: b.end_date,
            total_price: b.total_price,
            status: b.status.as_str().to_string(),
            booked_on: b.created_at.date_naive(),
        })
        .collect()
}

pub fn revenue_rows(bookings: &[Booking]) -> Vec<RevenueRow> {
    let mut by_day: BTreeMap<NaiveDate, (u64, Decimal)> = BTreeMap::new();
    for b in bookings.iter().filter(|b| counts_toward_revenue(b)) {
        let entry = by_day.entry(b.created_at.date_naive()).or_default();
        entry.0 += 1;
        entry.1 += b.total_price;
    }

    by_day
        .into_iter()
        .map(|(date, (bookings, revenue))| RevenueRow {
            date,
            bookings,
            revenue,
        })
        .collect()
}

pub fn product_rows(bookings: &[Booking], products: &[Product]) -> Vec<ProductRow> {
    let mut totals: HashMap<&str, (u64, Decimal)> = HashMap::new();
    for b in bookings.iter().filter(|b| counts_toward_revenue(b)) {
        let entry = totals.entry(b.product_id.as_str()).or_default();
        entry.0 += 1;
        entry.1 += b.total_price;
    }

    products
        .iter()
        .map(|p| {
            let (bookings, revenue) = totals.get(p.id.as_str()).copied().unwrap_or_default();
            ProductRow {
                product_id: p.id.clone(),
                name: p.name.clone(),
                category: p.category.clone(),
                daily_price: p.price,
                bookings,
                revenue,
            }
        })
        .collect()
}

pub fn customer_rows(bookings: &[Booking]) -> Vec<CustomerRow> {
    let mut by_customer: BTreeMap<&str, (u64, Decimal, NaiveDate)> = BTreeMap::new();
    for b in bookings.iter().filter(|b| counts_toward_revenue(b)) {
        let booked_on = b.created_at.date_naive();
        let entry = by_customer
            .entry(b.end_user.as_str())
            .or_insert((0, Decimal::ZERO, booked_on));
        entry.0 += 1;
        entry.1 += b.total_price;
        entry.2 = entry.2.max(booked_on);
    }

    by_customer
        .into_iter()
        .map(|(customer, (bookings, total_spent, last_booking))| CustomerRow {
            customer: customer.to_string(),
            bookings,
            total_spent,
            last_booking,
        })
        .collect()
}
