use std::fmt::Write;

use super::{escape, layout, money, percent, signed};
use crate::models::portfolio::AnalyticsContext;

pub fn render(ctx: &AnalyticsContext) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<h1>Analytics</h1>
<div class="cards">
<div class="card"><div class="label">Total portfolio value</div><div class="value">{}</div></div>
<div class="card"><div class="label">Cash balance</div><div class="value">{}</div></div>
<div class="card"><div class="label">Invested</div><div class="value">{}</div></div>
<div class="card"><div class="label">Unrealized P/L</div><div class="value">{} ({})</div></div>
<div class="card"><div class="label">Win rate</div><div class="value">{}</div><div class="label">{} won / {} lost</div></div>
<div class="card"><div class="label">Trades</div><div class="value">{}</div><div class="label">{} buys / {} sells</div></div>
</div>"#,
        money(ctx.total_portfolio_value),
        money(ctx.balance),
        money(ctx.total_invested),
        signed(ctx.profit_loss),
        percent(ctx.profit_loss_percentage),
        percent(ctx.win_rate.win_rate),
        ctx.win_rate.winning_trades,
        ctx.win_rate.losing_trades,
        ctx.total_trades,
        ctx.buy_trades,
        ctx.sell_trades,
    );

    body.push_str("<h2>Trade history</h2>");
    if ctx.trades.is_empty() {
        body.push_str("<p>No trades yet.</p>");
    } else {
        body.push_str("<table><tr><th>Time</th><th>Symbol</th><th>Type</th><th>Qty</th><th>Price</th><th>Total</th></tr>");
        for trade in &ctx.trades {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&trade.timestamp),
                escape(&trade.symbol),
                escape(&trade.trade_type),
                trade.quantity,
                money(trade.price),
                money(trade.total_value),
            );
        }
        body.push_str("</table>");
    }

    layout("Analytics", Some(&ctx.username), ctx.flash.as_ref(), &body)
}
