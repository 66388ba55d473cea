//! Trade sides and the request/response types of the trade endpoints

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Direction of a trade, stored as `BUY` / `SELL`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeSide::Buy => "Buy",
            TradeSide::Sell => "Sell",
        }
    }
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(TradeSide::Buy),
            "SELL" => Ok(TradeSide::Sell),
            _ => Err(format!("Unknown trade type: {}", s)),
        }
    }
}

/// `POST /trade` form body
#[derive(Debug, Clone, Deserialize)]
pub struct TradeForm {
    pub stock: i32,
    pub trade_type: String,
    pub quantity: i32,
}

/// `GET /trade?stock=SYMBOL`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradePageQuery {
    pub stock: Option<String>,
}

/// `POST /quick_trade` JSON body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickTradeRequest {
    pub stock_id: i32,
    pub trade_type: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickTradeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss: Option<f64>,
}

impl QuickTradeResponse {
    pub fn executed(message: String, new_balance: Decimal, profit_loss: Option<Decimal>) -> Self {
        Self {
            success: true,
            message: Some(message),
            error: None,
            new_balance: new_balance.to_f64(),
            profit_loss: profit_loss.and_then(|pl| pl.to_f64()),
        }
    }

    /// `balance` is the unchanged cash balance, when it could be read
    pub fn failed(error: impl Into<String>, balance: Option<Decimal>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            new_balance: balance.and_then(|b| b.to_f64()),
            profit_loss: None,
        }
    }
}
