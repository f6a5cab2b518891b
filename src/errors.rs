use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Bad client input. Raised before anything touches the network or the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("end date must be after the start date")]
    InvalidDateRange,

    #[error("price must be greater than zero")]
    InvalidPrice,

    #[error("amount must be a positive value in minor currency units")]
    InvalidAmount,

    #[error("amount is out of range")]
    AmountOutOfRange,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid price filter: {0}")]
    InvalidPriceFilter(String),

    #[error("unknown booking status: {0}")]
    InvalidStatus(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}

/// Recovers a `ValidationError` or `rusqlite::Error` wrapped by the query helpers.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ValidationError>() {
            Ok(validation) => return AppError::Validation(validation),
            Err(err) => err,
        };
        match err.downcast::<rusqlite::Error>() {
            Ok(db) => AppError::Database(db),
            Err(err) => AppError::Internal(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "success": false, "message": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
