//! Error types surfaced at the request boundary

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use rust_decimal::Decimal;
use sea_orm::DbErr;

/// Everything that can stop a trade from executing
///
/// The `Display` text is what the user sees, either as a flash message or in
/// the `error` field of the quick-trade response.
#[derive(Debug, thiserror::Error)]
pub enum TradeError {
    #[error("Quantity must be at least 1 (got {0})")]
    InvalidQuantity(i32),
    #[error("Insufficient balance! Required {required:.2}, available {available:.2}")]
    InsufficientFunds { required: Decimal, available: Decimal },
    #[error("Insufficient shares! You hold {held} shares of {symbol}, tried to sell {requested}")]
    InsufficientShares {
        symbol: String,
        held: i32,
        requested: i32,
    },
    #[error("You do not own this stock! ({0})")]
    NotOwned(String),
    #[error("Stock {0} not found")]
    StockNotFound(String),
    #[error("No trading profile found for user {0}")]
    ProfileNotFound(i32),
    #[error("Invalid trade request: {0}")]
    InvalidRequest(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("A user with that username already exists")]
    UsernameTaken,
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Failure while rendering a page
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Page request failed");
        }
        let body = crate::templates::error_page(status, &self.to_string());
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trade_error_messages() {
        let err = TradeError::InsufficientFunds {
            required: dec!(1000),
            available: dec!(10.5),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance! Required 1000.00, available 10.50"
        );

        let err = TradeError::NotOwned("NABIL".to_string());
        assert!(err.to_string().contains("do not own"));
    }

    #[test]
    fn test_app_error_status() {
        assert_eq!(
            AppError::NotFound("Stock".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database(DbErr::Custom("boom".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
