use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::models::date::WIRE_FORMAT;
use crate::models::{Booking, BookingStatus, Product, ProductFilter, ProductPage};
use crate::services::pricing::{from_minor_units, to_minor_units};

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, price_minor, image_url, location, is_available, created_at";
const BOOKING_COLUMNS: &str =
    "id, product_id, start_date, end_date, total_minor, end_user, status, created_at";

fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn conversion_error(idx: usize, err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, WIRE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        price: from_minor_units(row.get(4)?),
        image_url: row.get(5)?,
        location: row.get(6)?,
        is_available: row.get(7)?,
        created_at: parse_timestamp(row, 8)?,
    })
}

fn booking_from_row(row: &Row<'_>) -> rusqlite::Result<Booking> {
    let status: String = row.get(6)?;
    Ok(Booking {
        id: row.get(0)?,
        product_id: row.get(1)?,
        start_date: parse_date(row, 2)?,
        end_date: parse_date(row, 3)?,
        total_price: from_minor_units(row.get(4)?),
        end_user: row.get(5)?,
        status: BookingStatus::parse(&status)
            .ok_or_else(|| conversion_error(6, format!("unknown booking status: {status}")))?,
        created_at: parse_timestamp(row, 7)?,
    })
}

// ── Products ──

pub fn list_products(conn: &Connection, filter: &ProductFilter) -> anyhow::Result<ProductPage> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Value> = Vec::new();

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        args.push(Value::Text(format!("%{}%", search.to_lowercase())));
        let n = args.len();
        clauses.push(format!("(LOWER(name) LIKE ?{n} OR LOWER(description) LIKE ?{n})"));
    }
    if let Some(category) = filter.category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        args.push(Value::Text(category.to_lowercase()));
        clauses.push(format!("LOWER(category) = ?{}", args.len()));
    }
    if let Some(min) = filter.min_price {
        args.push(Value::Integer(to_minor_units(min)?));
        clauses.push(format!("price_minor >= ?{}", args.len()));
    }
    if let Some(max) = filter.max_price {
        args.push(Value::Integer(to_minor_units(max)?));
        clauses.push(format!("price_minor <= ?{}", args.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM products {where_sql}"),
        params_from_iter(args.iter()),
        |row| row.get(0),
    )?;

    let limit = i64::from(filter.limit.max(1));
    let offset = i64::from(filter.page.max(1) - 1) * limit;
    args.push(Value::Integer(limit));
    let limit_idx = args.len();
    args.push(Value::Integer(offset));
    let offset_idx = args.len();

    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products {where_sql} ORDER BY {} LIMIT ?{limit_idx} OFFSET ?{offset_idx}",
        filter.sort.order_by()
    );
    let mut stmt = conn.prepare(&sql)?;
    let products = stmt
        .query_map(params_from_iter(args.iter()), product_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProductPage { products, total })
}

pub fn get_product(conn: &Connection, id: &str) -> anyhow::Result<Option<Product>> {
    let product = conn
        .query_row(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
            params![id],
            product_from_row,
        )
        .optional()?;
    Ok(product)
}

pub fn insert_product(conn: &Connection, product: &Product) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO products (id, name, description, category, price_minor, image_url, location, is_available, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            product.id,
            product.name,
            product.description,
            product.category,
            to_minor_units(product.price)?,
            product.image_url,
            product.location,
            product.is_available,
            timestamp(&product.created_at),
        ],
    )?;
    Ok(())
}

pub fn update_product(conn: &Connection, product: &Product) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE products SET name = ?2, description = ?3, category = ?4, price_minor = ?5,
           image_url = ?6, location = ?7, is_available = ?8
         WHERE id = ?1",
        params![
            product.id,
            product.name,
            product.description,
            product.category,
            to_minor_units(product.price)?,
            product.image_url,
            product.location,
            product.is_available,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_product(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn all_products(conn: &Connection) -> anyhow::Result<Vec<Product>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC"
    ))?;
    let products = stmt
        .query_map([], product_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(products)
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, product_id, start_date, end_date, total_minor, end_user, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            booking.id,
            booking.product_id,
            booking.start_date.format(WIRE_FORMAT).to_string(),
            booking.end_date.format(WIRE_FORMAT).to_string(),
            to_minor_units(booking.total_price)?,
            booking.end_user,
            booking.status.as_str(),
            timestamp(&booking.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let booking = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            booking_from_row,
        )
        .optional()?;
    Ok(booking)
}

pub fn list_bookings(
    conn: &Connection,
    status: Option<BookingStatus>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let bookings = match status {
        Some(status) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![status.as_str(), limit], booking_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 ORDER BY created_at DESC, rowid DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], booking_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(bookings)
}

pub fn all_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at ASC, rowid ASC"
    ))?;
    let bookings = stmt
        .query_map([], booking_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

// ── Dashboard ──

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub products: i64,
    pub bookings: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub cancelled: i64,
    pub revenue: Decimal,
}

pub fn get_dashboard_stats(conn: &Connection) -> anyhow::Result<DashboardStats> {
    let products: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;

    let (bookings, pending, confirmed, cancelled, revenue_minor): (i64, i64, i64, i64, i64) = conn
        .query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(status = 'pending'), 0),
                    COALESCE(SUM(status = 'confirmed'), 0),
                    COALESCE(SUM(status = 'cancelled'), 0),
                    COALESCE(SUM(CASE WHEN status != 'cancelled' THEN total_minor ELSE 0 END), 0)
             FROM bookings",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )?;

    Ok(DashboardStats {
        products,
        bookings,
        pending,
        confirmed,
        cancelled,
        revenue: from_minor_units(revenue_minor),
    })
}
