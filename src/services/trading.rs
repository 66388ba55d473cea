//! Trade validation and execution
//!
//! `place_trade` runs validate → mutate → record inside one database
//! transaction. Profile and position rows are read with `FOR UPDATE` so two
//! trades by the same user cannot interleave their read-modify-write on the
//! balance or the position (SQLite serializes writers on its own and ignores
//! the lock clause).
//!
//! Lock order is always profile, then position. Every path takes the profile
//! lock first, so concurrent buys and sells of one user queue on it instead
//! of deadlocking.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, warn};

use crate::entities::{portfolios, profiles, stocks, trades};
use crate::error::TradeError;
use crate::models::trade::TradeSide;
use crate::services::accounting::{
    realized_profit_loss, round_money, trade_value, weighted_average_price,
};

/// Outcome of an executed trade
#[derive(Debug, Clone)]
pub struct TradeReceipt {
    pub trade: trades::Model,
    pub symbol: String,
    pub side: TradeSide,
    pub new_balance: Decimal,
    /// Only set for sells
    pub realized_profit_loss: Option<Decimal>,
    /// Remaining position, `None` once fully liquidated
    pub position: Option<portfolios::Model>,
}

impl TradeReceipt {
    pub fn message(&self) -> String {
        let verb = match self.side {
            TradeSide::Buy => "bought",
            TradeSide::Sell => "sold",
        };
        format!(
            "Successfully {} {} shares of {}",
            verb, self.trade.quantity, self.symbol
        )
    }

}

/// Validate and execute a trade at the stock's current price
pub async fn place_trade(
    db: &DatabaseConnection,
    user_id: i32,
    stock_id: i32,
    side: TradeSide,
    quantity: i32,
) -> Result<TradeReceipt, TradeError> {
    let txn = db.begin().await?;

    let stock = stocks::Entity::find_by_id(stock_id)
        .one(&txn)
        .await?
        .ok_or_else(|| TradeError::StockNotFound(stock_id.to_string()))?;
    let price = stock.current_price;

    if let Err(e) = validate_trade(&txn, user_id, &stock, side, quantity, price).await {
        debug!(
            user_id,
            symbol = %stock.symbol,
            side = %side,
            quantity,
            reason = %e,
            "Trade rejected"
        );
        return Err(e);
    }

    let receipt = execute_trade(&txn, user_id, &stock, side, quantity, price).await?;
    txn.commit().await?;

    info!(
        user_id,
        trade_id = receipt.trade.id,
        symbol = %stock.symbol,
        side = %side,
        quantity,
        price = %price,
        new_balance = %receipt.new_balance,
        "Trade executed"
    );

    Ok(receipt)
}

/// Check that `user_id` can afford a buy or holds enough shares to sell
///
/// Has no side effects. A missing position on sell is reported as
/// [`TradeError::NotOwned`], distinct from holding too few shares. Inside a
/// transaction this leaves the profile row (and on sells the position row)
/// locked.
pub async fn validate_trade<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    stock: &stocks::Model,
    side: TradeSide,
    quantity: i32,
    price: Decimal,
) -> Result<(), TradeError> {
    if quantity <= 0 {
        return Err(TradeError::InvalidQuantity(quantity));
    }

    let profile = find_profile(conn, user_id).await?;

    match side {
        TradeSide::Buy => ensure_funds(&profile, trade_value(quantity, price)),
        TradeSide::Sell => {
            let position = find_position(conn, user_id, stock).await?;
            ensure_shares(position.as_ref(), stock, quantity).map(|_| ())
        }
    }
}

/// Apply a trade: move cash, update the position and append to the ledger
///
/// Buys re-check the balance before debiting; sells re-check the position.
/// Callers should run this inside a transaction together with
/// [`validate_trade`].
pub async fn execute_trade<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    stock: &stocks::Model,
    side: TradeSide,
    quantity: i32,
    price: Decimal,
) -> Result<TradeReceipt, TradeError> {
    if quantity <= 0 {
        return Err(TradeError::InvalidQuantity(quantity));
    }

    let profile = find_profile(conn, user_id).await?;
    let total = trade_value(quantity, price);
    let now = Utc::now().fixed_offset();

    let (new_balance, position, realized) = match side {
        TradeSide::Buy => {
            ensure_funds(&profile, total)?;
            let new_balance = round_money(profile.balance - total);
            update_balance(conn, profile, new_balance).await?;

            let position = match find_position(conn, user_id, stock).await? {
                Some(existing) => {
                    let average = weighted_average_price(
                        existing.quantity,
                        existing.average_buy_price,
                        quantity,
                        price,
                    );
                    let total_quantity = existing.quantity + quantity;
                    let mut active: portfolios::ActiveModel = existing.into();
                    active.quantity = Set(total_quantity);
                    active.average_buy_price = Set(round_money(average));
                    active.last_updated = Set(now);
                    active.update(conn).await?
                }
                None => {
                    portfolios::ActiveModel {
                        user_id: Set(user_id),
                        stock_id: Set(stock.id),
                        quantity: Set(quantity),
                        average_buy_price: Set(price),
                        last_updated: Set(now),
                        ..Default::default()
                    }
                    .insert(conn)
                    .await?
                }
            };

            (new_balance, Some(position), None)
        }
        TradeSide::Sell => {
            let existing = find_position(conn, user_id, stock).await?;
            let existing = ensure_shares(existing.as_ref(), stock, quantity)?.clone();

            let realized = realized_profit_loss(price, existing.average_buy_price, quantity);
            let remaining = existing.quantity - quantity;

            let position = if remaining == 0 {
                existing.delete(conn).await?;
                None
            } else {
                let mut active: portfolios::ActiveModel = existing.into();
                active.quantity = Set(remaining);
                active.last_updated = Set(now);
                Some(active.update(conn).await?)
            };

            let new_balance = round_money(profile.balance + total);
            update_balance(conn, profile, new_balance).await?;

            (new_balance, position, Some(realized))
        }
    };

    let trade = trades::ActiveModel {
        user_id: Set(user_id),
        stock_id: Set(stock.id),
        trade_type: Set(side.as_str().to_string()),
        quantity: Set(quantity),
        price: Set(price),
        timestamp: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(TradeReceipt {
        trade,
        symbol: stock.symbol.clone(),
        side,
        new_balance,
        realized_profit_loss: realized,
        position,
    })
}

async fn find_profile<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<profiles::Model, TradeError> {
    profiles::Entity::find()
        .filter(profiles::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| {
            warn!(user_id, "User has no trading profile");
            TradeError::ProfileNotFound(user_id)
        })
}

async fn find_position<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    stock: &stocks::Model,
) -> Result<Option<portfolios::Model>, TradeError> {
    Ok(portfolios::Entity::find()
        .filter(portfolios::Column::UserId.eq(user_id))
        .filter(portfolios::Column::StockId.eq(stock.id))
        .lock_exclusive()
        .one(conn)
        .await?)
}

async fn update_balance<C: ConnectionTrait>(
    conn: &C,
    profile: profiles::Model,
    balance: Decimal,
) -> Result<(), TradeError> {
    let mut active: profiles::ActiveModel = profile.into();
    active.balance = Set(balance);
    active.update(conn).await?;
    Ok(())
}

fn ensure_funds(profile: &profiles::Model, required: Decimal) -> Result<(), TradeError> {
    if profile.balance < required {
        return Err(TradeError::InsufficientFunds {
            required,
            available: profile.balance,
        });
    }
    Ok(())
}

fn ensure_shares<'a>(
    position: Option<&'a portfolios::Model>,
    stock: &stocks::Model,
    requested: i32,
) -> Result<&'a portfolios::Model, TradeError> {
    let position = position.ok_or_else(|| TradeError::NotOwned(stock.symbol.clone()))?;
    if position.quantity < requested {
        return Err(TradeError::InsufficientShares {
            symbol: stock.symbol.clone(),
            held: position.quantity,
            requested,
        });
    }
    Ok(position)
}
