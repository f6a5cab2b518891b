use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::{AppError, ValidationError};
use crate::models::date::parse_date;
use crate::models::{
    ApiResponse, Availability, PriceBreakdown, Product, ProductFilter, ProductList, ProductSort,
    QuoteRequest, RentalQuote,
};
use crate::services::pricing::{compute_breakdown, to_minor_units};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 12;
const MAX_PAGE_SIZE: u32 = 100;

// GET /api/products
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn parse_price(raw: Option<&str>) -> Result<Option<Decimal>, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => {
            let price = Decimal::from_str(s)
                .map_err(|_| ValidationError::InvalidPriceFilter(s.to_string()))?;
            to_minor_units(price)?;
            Ok(Some(price))
        }
    }
}

fn parse_sort(raw: Option<&str>) -> ProductSort {
    match raw.map(str::trim) {
        Some("price_asc") => ProductSort::PriceAsc,
        Some("price_desc") => ProductSort::PriceDesc,
        Some("name") => ProductSort::Name,
        _ => ProductSort::Newest,
    }
}

impl ProductsQuery {
    pub fn into_filter(self) -> Result<ProductFilter, ValidationError> {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let limit = self
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        Ok(ProductFilter {
            min_price: parse_price(self.min_price.as_deref())?,
            max_price: parse_price(self.max_price.as_deref())?,
            sort: parse_sort(self.sort.as_deref()),
            search: self.search,
            category: self.category,
            page,
            limit,
        })
    }
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<ProductList>, AppError> {
    let filter = query.into_filter()?;

    let page = {
        let db = state.conn()?;
        queries::list_products(&db, &filter)?
    };

    let limit = i64::from(filter.limit);
    Ok(Json(ProductList {
        success: true,
        total_pages: (page.total + limit - 1) / limit,
        total: page.total,
        page: filter.page,
        data: page.products,
    }))
}

fn load_product(state: &AppState, id: &str) -> Result<Product, AppError> {
    let db = state.conn()?;
    queries::get_product(&db, id)?.ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

// GET /api/products/:id
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = load_product(&state, &id)?;
    Ok(Json(ApiResponse::ok(product)))
}

// GET /api/products/availability/:id
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<Availability>>, AppError> {
    let product = load_product(&state, &id)?;

    let start = query.start_date.as_deref().map(parse_date).transpose()?;
    let end = query.end_date.as_deref().map(parse_date).transpose()?;
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ValidationError::InvalidDateRange.into());
        }
    }

    let message = if product.is_available {
        "Product is available for the selected dates"
    } else {
        "Product is not available for the selected dates"
    };

    Ok(Json(ApiResponse::ok(Availability {
        is_available: product.is_available,
        message: message.to_string(),
    })))
}

// POST /api/quotes
pub async fn quote(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<PriceBreakdown>>, AppError> {
    if request.quantity < 1 {
        return Err(ValidationError::InvalidQuantity.into());
    }

    let product = load_product(&state, &request.product_id)?;
    let breakdown = compute_breakdown(&RentalQuote {
        daily_price: product.price,
        start_date: request.start_date,
        end_date: request.end_date,
        quantity: request.quantity,
    })?;

    Ok(Json(ApiResponse::ok(breakdown)))
}
