//! Admin API request/response types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{stocks, trades};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStockPriceRequest {
    pub current_price: Decimal,
    pub previous_close: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeFilterQuery {
    pub trade_type: Option<String>,
    pub symbol: Option<String>,
    pub limit: Option<u64>,
}

impl TradeFilterQuery {
    pub const DEFAULT_LIMIT: u64 = 100;
    pub const MAX_LIMIT: u64 = 500;

    pub fn validate(&self) -> Result<(), String> {
        if let Some(limit) = self.limit {
            if limit < 1 || limit > Self::MAX_LIMIT {
                return Err(format!("limit must be between 1 and {}", Self::MAX_LIMIT));
            }
        }
        if let Some(trade_type) = &self.trade_type {
            trade_type
                .parse::<crate::models::trade::TradeSide>()
                .map(|_| ())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStock {
    pub id: i32,
    pub symbol: String,
    pub name: String,
    pub current_price: Decimal,
    pub previous_close: Decimal,
    pub last_updated: String,
}

impl From<stocks::Model> for AdminStock {
    fn from(model: stocks::Model) -> Self {
        Self {
            id: model.id,
            symbol: model.symbol,
            name: model.name,
            current_price: model.current_price,
            previous_close: model.previous_close,
            last_updated: model.last_updated.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStockListResponse {
    pub stocks: Vec<AdminStock>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminTrade {
    pub id: i32,
    pub user_id: i32,
    pub username: Option<String>,
    pub symbol: Option<String>,
    pub trade_type: String,
    pub quantity: i32,
    pub price: Decimal,
    pub timestamp: String,
}

impl AdminTrade {
    pub fn new(trade: trades::Model, username: Option<String>, symbol: Option<String>) -> Self {
        Self {
            id: trade.id,
            user_id: trade.user_id,
            username,
            symbol,
            trade_type: trade.trade_type,
            quantity: trade.quantity,
            price: trade.price,
            timestamp: trade.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminTradeListResponse {
    pub trades: Vec<AdminTrade>,
    pub total: usize,
}
