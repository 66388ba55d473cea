//! View models for the dashboard, portfolio and analytics pages

use rust_decimal::Decimal;
use serde::Serialize;

use crate::entities::{portfolios, stocks, trades};
use crate::models::common::FlashMessage;
use crate::services::accounting::{PositionValuation, WinRate};

/// A stock row as shown in the market watch and the trade form
#[derive(Debug, Clone, Serialize)]
pub struct StockQuote {
    pub id: i32,
    pub symbol: String,
    pub name: String,
    pub current_price: Decimal,
    pub previous_close: Decimal,
    pub todays_change: Decimal,
    pub todays_change_percentage: Decimal,
}

impl From<stocks::Model> for StockQuote {
    fn from(stock: stocks::Model) -> Self {
        Self {
            todays_change: stock.todays_change(),
            todays_change_percentage: stock.todays_change_percentage(),
            id: stock.id,
            symbol: stock.symbol,
            name: stock.name,
            current_price: stock.current_price,
            previous_close: stock.previous_close,
        }
    }
}

/// One open position with its mark-to-market figures
#[derive(Debug, Clone, Serialize)]
pub struct PositionView {
    pub stock_id: i32,
    pub symbol: String,
    pub name: String,
    pub quantity: i32,
    pub average_buy_price: Decimal,
    pub current_price: Decimal,
    pub invested_value: Decimal,
    pub current_value: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_percentage: Decimal,
    pub todays_change: Decimal,
    pub todays_change_percentage: Decimal,
}

impl PositionView {
    pub fn new(position: &portfolios::Model, stock: &stocks::Model) -> Self {
        let valuation = PositionView::valuation_of(position, stock);
        Self {
            stock_id: stock.id,
            symbol: stock.symbol.clone(),
            name: stock.name.clone(),
            quantity: position.quantity,
            average_buy_price: position.average_buy_price,
            current_price: stock.current_price,
            invested_value: valuation.invested_value(),
            current_value: valuation.current_value(),
            profit_loss: valuation.profit_loss(),
            profit_loss_percentage: valuation.profit_loss_percentage(),
            todays_change: valuation.todays_change(),
            todays_change_percentage: valuation.todays_change_percentage(),
        }
    }

    pub fn valuation_of(position: &portfolios::Model, stock: &stocks::Model) -> PositionValuation {
        PositionValuation {
            quantity: position.quantity,
            average_buy_price: position.average_buy_price,
            current_price: stock.current_price,
            previous_close: stock.previous_close,
        }
    }
}

/// A ledger entry joined with its stock
#[derive(Debug, Clone, Serialize)]
pub struct TradeView {
    pub id: i32,
    pub symbol: String,
    pub trade_type: String,
    pub quantity: i32,
    pub price: Decimal,
    pub total_value: Decimal,
    pub timestamp: String,
}

impl TradeView {
    pub fn new(trade: &trades::Model, symbol: &str) -> Self {
        Self {
            id: trade.id,
            symbol: symbol.to_string(),
            trade_type: trade.trade_type.clone(),
            quantity: trade.quantity,
            price: trade.price,
            total_value: trade.total_value(),
            timestamp: trade.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardContext {
    pub username: String,
    pub balance: Decimal,
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub todays_pl: Decimal,
    pub positions: Vec<PositionView>,
    pub market: Vec<StockQuote>,
    pub recent_trades: Vec<TradeView>,
    pub flash: Option<FlashMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioContext {
    pub username: String,
    pub positions: Vec<PositionView>,
    pub total_invested: Decimal,
    pub total_current: Decimal,
    pub total_pl: Decimal,
    pub total_pl_percentage: Decimal,
    pub flash: Option<FlashMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsContext {
    pub username: String,
    pub trades: Vec<TradeView>,
    pub total_invested: Decimal,
    pub total_current: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_percentage: Decimal,
    pub balance: Decimal,
    pub total_portfolio_value: Decimal,
    pub total_trades: u64,
    pub buy_trades: u64,
    pub sell_trades: u64,
    pub win_rate: WinRateView,
    pub flash: Option<FlashMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WinRateView {
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: Decimal,
}

impl From<WinRate> for WinRateView {
    fn from(stats: WinRate) -> Self {
        Self {
            winning_trades: stats.winning_trades,
            losing_trades: stats.losing_trades,
            win_rate: stats.win_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TradePageContext {
    pub username: String,
    pub balance: Decimal,
    pub stocks: Vec<StockQuote>,
    pub selected_stock: Option<StockQuote>,
    pub holdings: Vec<PositionView>,
    pub flash: Option<FlashMessage>,
}
