//! Admin API for stock maintenance and trade inspection
//!
//! Protected by the `X-API-Key` header matched against `ADMIN_API_KEY`.
//! Lives under `/admin/`, which the login middleware lets through.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use std::collections::HashMap;
use tracing::info;

use crate::entities::{stocks, trades, users};
use crate::models::admin::{
    AdminStock, AdminStockListResponse, AdminTrade, AdminTradeListResponse, StockSearchQuery,
    TradeFilterQuery, UpdateStockPriceRequest,
};
use crate::models::common::ErrorResponse;
use crate::models::trade::TradeSide;
use crate::services::accounting::round_money;
use crate::services::auth;
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into() }))
}

fn db_error(e: sea_orm::DbErr) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
}

fn require_api_key(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.config.admin_api_key.as_deref() else {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Admin API is disabled",
        ));
    };

    let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    match provided {
        Some(key) if auth::secrets_match(expected, key) => Ok(()),
        _ => Err(api_error(StatusCode::UNAUTHORIZED, "Invalid or missing API key")),
    }
}

// GET /admin/stocks
pub async fn list_stocks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StockSearchQuery>,
) -> Result<Json<AdminStockListResponse>, ApiError> {
    require_api_key(&state, &headers)?;

    let mut select = stocks::Entity::find().order_by_asc(stocks::Column::Symbol);
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(stocks::Column::Symbol.contains(search.to_uppercase()))
                .add(stocks::Column::Name.contains(search)),
        );
    }

    let stocks: Vec<AdminStock> = select
        .all(&state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(AdminStock::from)
        .collect();

    Ok(Json(AdminStockListResponse {
        total: stocks.len(),
        stocks,
    }))
}

// PUT /admin/stocks/{symbol}
pub async fn update_stock_price(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(symbol): Path<String>,
    Json(payload): Json<UpdateStockPriceRequest>,
) -> Result<Json<AdminStock>, ApiError> {
    require_api_key(&state, &headers)?;

    if payload.current_price <= Decimal::ZERO {
        return Err(api_error(StatusCode::BAD_REQUEST, "current_price must be positive"));
    }
    if payload.previous_close.is_some_and(|p| p < Decimal::ZERO) {
        return Err(api_error(StatusCode::BAD_REQUEST, "previous_close cannot be negative"));
    }

    let stock = stocks::Entity::find()
        .filter(stocks::Column::Symbol.eq(symbol.to_uppercase()))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Stock {} not found", symbol)))?;

    let mut active: stocks::ActiveModel = stock.into();
    active.current_price = Set(round_money(payload.current_price));
    if let Some(previous_close) = payload.previous_close {
        active.previous_close = Set(round_money(previous_close));
    }
    active.last_updated = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.db).await.map_err(db_error)?;

    info!(
        symbol = %updated.symbol,
        current_price = %updated.current_price,
        previous_close = %updated.previous_close,
        "Stock repriced"
    );

    Ok(Json(AdminStock::from(updated)))
}

// GET /admin/trades
pub async fn list_trades(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TradeFilterQuery>,
) -> Result<Json<AdminTradeListResponse>, ApiError> {
    require_api_key(&state, &headers)?;
    query
        .validate()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    let mut select = trades::Entity::find()
        .find_also_related(stocks::Entity)
        .order_by_desc(trades::Column::Timestamp)
        .order_by_desc(trades::Column::Id)
        .limit(query.limit.unwrap_or(TradeFilterQuery::DEFAULT_LIMIT));

    if let Some(side) = query.trade_type.as_deref().and_then(|t| t.parse::<TradeSide>().ok()) {
        select = select.filter(trades::Column::TradeType.eq(side.as_str()));
    }
    if let Some(symbol) = query.symbol.as_deref() {
        select = select.filter(stocks::Column::Symbol.eq(symbol.to_uppercase()));
    }

    let rows = select.all(&state.db).await.map_err(db_error)?;

    let user_ids: Vec<i32> = rows.iter().map(|(trade, _)| trade.user_id).collect();
    let usernames: HashMap<i32, String> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(&state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|user| (user.id, user.username))
        .collect();

    let trades: Vec<AdminTrade> = rows
        .into_iter()
        .map(|(trade, stock)| {
            let username = usernames.get(&trade.user_id).cloned();
            AdminTrade::new(trade, username, stock.map(|s| s.symbol))
        })
        .collect();

    Ok(Json(AdminTradeListResponse {
        total: trades.len(),
        trades,
    }))
}
