//! Portfolio accounting
//!
//! Pure arithmetic behind trade execution and the portfolio pages: daily
//! price change, weighted-average cost, realized and unrealized P/L, and the
//! approximate win rate shown on the analytics page.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::trade::TradeSide;

/// Stored monetary columns carry two decimal places.
pub const MONEY_SCALE: u32 = 2;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round a monetary amount to the stored scale
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_SCALE)
}

/// `part / whole * 100`, or zero when `whole` is not positive
pub fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        part / whole * HUNDRED
    } else {
        Decimal::ZERO
    }
}

pub fn daily_change(current_price: Decimal, previous_close: Decimal) -> Decimal {
    current_price - previous_close
}

pub fn daily_change_percentage(current_price: Decimal, previous_close: Decimal) -> Decimal {
    percentage_of(daily_change(current_price, previous_close), previous_close)
}

/// Cost of `quantity` shares at `price`
pub fn trade_value(quantity: i32, price: Decimal) -> Decimal {
    Decimal::from(quantity) * price
}

/// Average cost after buying `quantity` more shares at `price`
///
/// `(old_qty * old_avg + qty * price) / (old_qty + qty)`. An empty position
/// simply takes the purchase price.
pub fn weighted_average_price(
    old_quantity: i32,
    old_average: Decimal,
    quantity: i32,
    price: Decimal,
) -> Decimal {
    let total_quantity = old_quantity + quantity;
    if old_quantity <= 0 || total_quantity <= 0 {
        return price;
    }

    (trade_value(old_quantity, old_average) + trade_value(quantity, price))
        / Decimal::from(total_quantity)
}

/// P/L booked when selling `quantity` shares at `sale_price`
pub fn realized_profit_loss(
    sale_price: Decimal,
    average_buy_price: Decimal,
    quantity: i32,
) -> Decimal {
    (sale_price - average_buy_price) * Decimal::from(quantity)
}

/// Mark-to-market view of a single position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionValuation {
    pub quantity: i32,
    pub average_buy_price: Decimal,
    pub current_price: Decimal,
    pub previous_close: Decimal,
}

impl PositionValuation {
    pub fn invested_value(&self) -> Decimal {
        trade_value(self.quantity, self.average_buy_price)
    }

    pub fn current_value(&self) -> Decimal {
        trade_value(self.quantity, self.current_price)
    }

    pub fn profit_loss(&self) -> Decimal {
        self.current_value() - self.invested_value()
    }

    pub fn profit_loss_percentage(&self) -> Decimal {
        percentage_of(self.profit_loss(), self.invested_value())
    }

    /// Today's move on the whole position
    pub fn todays_change(&self) -> Decimal {
        daily_change(self.current_price, self.previous_close) * Decimal::from(self.quantity)
    }

    pub fn todays_change_percentage(&self) -> Decimal {
        daily_change_percentage(self.current_price, self.previous_close)
    }
}

/// Sums across every open position of a user
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PortfolioTotals {
    pub total_invested: Decimal,
    pub total_current: Decimal,
    pub todays_profit_loss: Decimal,
}

impl PortfolioTotals {
    pub fn from_positions<'a, I>(positions: I) -> Self
    where
        I: IntoIterator<Item = &'a PositionValuation>,
    {
        positions
            .into_iter()
            .fold(PortfolioTotals::default(), |mut acc, position| {
                acc.total_invested += position.invested_value();
                acc.total_current += position.current_value();
                acc.todays_profit_loss += position.todays_change();
                acc
            })
    }

    pub fn total_profit_loss(&self) -> Decimal {
        self.total_current - self.total_invested
    }

    pub fn total_profit_loss_percentage(&self) -> Decimal {
        percentage_of(self.total_profit_loss(), self.total_invested)
    }
}

/// The fields of a trade the win-rate approximation looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeFill {
    pub stock_id: i32,
    pub side: TradeSide,
    pub price: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WinRate {
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: Decimal,
}

impl WinRate {
    pub fn closed_trades(&self) -> usize {
        self.winning_trades + self.losing_trades
    }
}

/// Approximate win rate over fills given oldest first
///
/// Each SELL is paired with the most recent preceding unpaired BUY of the
/// same stock and counts as a win when it sold above that buy's price. This
/// ignores quantities, so it is not FIFO/LIFO lot accounting. SELLs with no
/// BUY to pair with are skipped.
pub fn win_rate(fills: &[TradeFill]) -> WinRate {
    let mut open_buys: HashMap<i32, Vec<Decimal>> = HashMap::new();
    let mut result = WinRate::default();

    for fill in fills {
        match fill.side {
            TradeSide::Buy => open_buys.entry(fill.stock_id).or_default().push(fill.price),
            TradeSide::Sell => {
                let Some(buy_price) = open_buys.get_mut(&fill.stock_id).and_then(Vec::pop) else {
                    continue;
                };
                if fill.price > buy_price {
                    result.winning_trades += 1;
                } else {
                    result.losing_trades += 1;
                }
            }
        }
    }

    result.win_rate = percentage_of(
        Decimal::from(result.winning_trades),
        Decimal::from(result.closed_trades()),
    );
    result
}
