//! Read-side queries behind the dashboard, portfolio, analytics and trade pages
//!
//! Nothing here is cached or stored; every page recomputes its figures from
//! the current `portfolios`, `stocks`, `trades` and `profiles` rows.

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::collections::HashMap;

use crate::entities::{portfolios, profiles, stocks, trades};
use crate::models::portfolio::{
    AnalyticsContext, DashboardContext, PortfolioContext, PositionView, StockQuote,
    TradePageContext, TradeView,
};
use crate::models::trade::TradeSide;
use crate::services::accounting::{win_rate, PortfolioTotals, PositionValuation, TradeFill};
use crate::services::auth::CurrentUser;

/// Trades listed on the analytics page
pub const ANALYTICS_TRADE_LIMIT: u64 = 50;

/// Trades listed on the dashboard
pub const DASHBOARD_TRADE_LIMIT: u64 = 5;

/// Open positions of a user with their stocks, ordered by symbol
pub async fn load_positions(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<(portfolios::Model, stocks::Model)>, DbErr> {
    let rows = portfolios::Entity::find()
        .filter(portfolios::Column::UserId.eq(user_id))
        .find_also_related(stocks::Entity)
        .order_by_asc(stocks::Column::Symbol)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(position, stock)| stock.map(|stock| (position, stock)))
        .collect())
}

pub async fn load_balance(db: &DatabaseConnection, user_id: i32) -> Result<Decimal, DbErr> {
    let profile = profiles::Entity::find()
        .filter(profiles::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    Ok(profile.map(|p| p.balance).unwrap_or(Decimal::ZERO))
}

pub async fn load_stocks(db: &DatabaseConnection) -> Result<Vec<stocks::Model>, DbErr> {
    stocks::Entity::find()
        .order_by_asc(stocks::Column::Symbol)
        .all(db)
        .await
}

/// Most recent trades of a user, newest first
pub async fn recent_trades(
    db: &DatabaseConnection,
    user_id: i32,
    limit: u64,
) -> Result<Vec<TradeView>, DbErr> {
    let rows = trades::Entity::find()
        .filter(trades::Column::UserId.eq(user_id))
        .find_also_related(stocks::Entity)
        .order_by_desc(trades::Column::Timestamp)
        .order_by_desc(trades::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    Ok(rows
        .iter()
        .map(|(trade, stock)| {
            let symbol = stock.as_ref().map(|s| s.symbol.as_str()).unwrap_or("?");
            TradeView::new(trade, symbol)
        })
        .collect())
}

fn summarize(
    positions: &[(portfolios::Model, stocks::Model)],
) -> (Vec<PositionView>, PortfolioTotals) {
    let valuations: Vec<PositionValuation> = positions
        .iter()
        .map(|(position, stock)| PositionView::valuation_of(position, stock))
        .collect();
    let views = positions
        .iter()
        .map(|(position, stock)| PositionView::new(position, stock))
        .collect();

    (views, PortfolioTotals::from_positions(&valuations))
}

pub async fn dashboard_context(
    db: &DatabaseConnection,
    user: &CurrentUser,
) -> Result<DashboardContext, DbErr> {
    let positions = load_positions(db, user.id).await?;
    let (positions, totals) = summarize(&positions);

    Ok(DashboardContext {
        username: user.username.clone(),
        balance: load_balance(db, user.id).await?,
        total_value: totals.total_current,
        total_invested: totals.total_invested,
        todays_pl: totals.todays_profit_loss,
        positions,
        market: load_stocks(db).await?.into_iter().map(StockQuote::from).collect(),
        recent_trades: recent_trades(db, user.id, DASHBOARD_TRADE_LIMIT).await?,
        flash: None,
    })
}

pub async fn portfolio_context(
    db: &DatabaseConnection,
    user: &CurrentUser,
) -> Result<PortfolioContext, DbErr> {
    let positions = load_positions(db, user.id).await?;
    let (positions, totals) = summarize(&positions);

    Ok(PortfolioContext {
        username: user.username.clone(),
        positions,
        total_invested: totals.total_invested,
        total_current: totals.total_current,
        total_pl: totals.total_profit_loss(),
        total_pl_percentage: totals.total_profit_loss_percentage(),
        flash: None,
    })
}

/// Every trade of a user as win-rate input, oldest first
async fn trade_fills(db: &DatabaseConnection, user_id: i32) -> Result<Vec<TradeFill>, DbErr> {
    let rows = trades::Entity::find()
        .filter(trades::Column::UserId.eq(user_id))
        .order_by_asc(trades::Column::Timestamp)
        .order_by_asc(trades::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|trade| {
            let side = trade.trade_type.parse::<TradeSide>().ok()?;
            Some(TradeFill {
                stock_id: trade.stock_id,
                side,
                price: trade.price,
            })
        })
        .collect())
}

pub async fn analytics_context(
    db: &DatabaseConnection,
    user: &CurrentUser,
) -> Result<AnalyticsContext, DbErr> {
    let positions = load_positions(db, user.id).await?;
    let (_, totals) = summarize(&positions);
    let balance = load_balance(db, user.id).await?;

    let fills = trade_fills(db, user.id).await?;
    let mut counts: HashMap<TradeSide, u64> = HashMap::new();
    for fill in &fills {
        *counts.entry(fill.side).or_default() += 1;
    }

    Ok(AnalyticsContext {
        username: user.username.clone(),
        trades: recent_trades(db, user.id, ANALYTICS_TRADE_LIMIT).await?,
        total_invested: totals.total_invested,
        total_current: totals.total_current,
        profit_loss: totals.total_profit_loss(),
        profit_loss_percentage: totals.total_profit_loss_percentage(),
        balance,
        total_portfolio_value: totals.total_current + balance,
        total_trades: trades::Entity::find()
            .filter(trades::Column::UserId.eq(user.id))
            .count(db)
            .await?,
        buy_trades: counts.get(&TradeSide::Buy).copied().unwrap_or(0),
        sell_trades: counts.get(&TradeSide::Sell).copied().unwrap_or(0),
        win_rate: win_rate(&fills).into(),
        flash: None,
    })
}

/// Trade form data; `selected_symbol` comes from `?stock=SYMBOL`
pub async fn trade_page_context(
    db: &DatabaseConnection,
    user: &CurrentUser,
    selected_symbol: Option<&str>,
) -> Result<TradePageContext, DbErr> {
    let stocks: Vec<StockQuote> = load_stocks(db)
        .await?
        .into_iter()
        .map(StockQuote::from)
        .collect();

    let selected_stock = selected_symbol.and_then(|symbol| {
        stocks
            .iter()
            .find(|stock| stock.symbol.eq_ignore_ascii_case(symbol.trim()))
            .cloned()
    });

    let positions = load_positions(db, user.id).await?;
    let (holdings, _) = summarize(&positions);

    Ok(TradePageContext {
        username: user.username.clone(),
        balance: load_balance(db, user.id).await?,
        stocks,
        selected_stock,
        holdings,
        flash: None,
    })
}
