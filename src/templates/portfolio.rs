use std::fmt::Write;

use super::{escape, layout, money, percent, signed};
use crate::models::portfolio::PortfolioContext;

pub fn render(ctx: &PortfolioContext) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<h1>Portfolio</h1>
<div class="cards">
<div class="card"><div class="label">Invested</div><div class="value">{}</div></div>
<div class="card"><div class="label">Current value</div><div class="value">{}</div></div>
<div class="card"><div class="label">Total P/L</div><div class="value">{} ({})</div></div>
</div>"#,
        money(ctx.total_invested),
        money(ctx.total_current),
        signed(ctx.total_pl),
        percent(ctx.total_pl_percentage),
    );

    if ctx.positions.is_empty() {
        body.push_str("<p>No open positions.</p>");
    } else {
        body.push_str("<table><tr><th>Symbol</th><th>Name</th><th>Qty</th><th>Avg price</th><th>Price</th><th>Invested</th><th>Value</th><th>P/L</th><th>P/L %</th><th>Today</th></tr>");
        for p in &ctx.positions {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} ({})</td></tr>",
                escape(&p.symbol),
                escape(&p.name),
                p.quantity,
                money(p.average_buy_price),
                money(p.current_price),
                money(p.invested_value),
                money(p.current_value),
                signed(p.profit_loss),
                percent(p.profit_loss_percentage),
                signed(p.todays_change),
                percent(p.todays_change_percentage),
            );
        }
        body.push_str("</table>");
    }

    layout("Portfolio", Some(&ctx.username), ctx.flash.as_ref(), &body)
}
