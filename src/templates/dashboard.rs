use std::fmt::Write;

use super::{escape, layout, money, percent, signed};
use crate::models::portfolio::DashboardContext;

pub fn render(ctx: &DashboardContext) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<h1>Dashboard</h1>
<div class="cards">
<div class="card"><div class="label">Cash balance</div><div class="value" id="balance">{}</div></div>
<div class="card"><div class="label">Holdings value</div><div class="value">{}</div></div>
<div class="card"><div class="label">Invested</div><div class="value">{}</div></div>
<div class="card"><div class="label">Today's P/L</div><div class="value">{}</div></div>
</div>"#,
        money(ctx.balance),
        money(ctx.total_value),
        money(ctx.total_invested),
        signed(ctx.todays_pl),
    );

    body.push_str("<h2>Holdings</h2>");
    if ctx.positions.is_empty() {
        body.push_str(r#"<p>You don't own any stocks yet. <a href="/trade">Place a trade</a>.</p>"#);
    } else {
        body.push_str("<table><tr><th>Symbol</th><th>Qty</th><th>Avg price</th><th>Price</th><th>Value</th><th>Today</th></tr>");
        for position in &ctx.positions {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&position.symbol),
                position.quantity,
                money(position.average_buy_price),
                money(position.current_price),
                money(position.current_value),
                signed(position.todays_change),
            );
        }
        body.push_str("</table>");
    }

    body.push_str("<h2>Market</h2><table><tr><th>Symbol</th><th>Name</th><th>Price</th><th>Change</th><th></th></tr>");
    for stock in &ctx.market {
        let _ = write!(
            body,
            r#"<tr><td><a href="/trade?stock={symbol}">{symbol}</a></td><td>{name}</td><td>{price}</td><td>{change} ({pct})</td><td><button onclick="quickTrade({id}, 'BUY')">Buy 1</button> <button onclick="quickTrade({id}, 'SELL')">Sell 1</button></td></tr>"#,
            symbol = escape(&stock.symbol),
            name = escape(&stock.name),
            price = money(stock.current_price),
            change = signed(stock.todays_change),
            pct = percent(stock.todays_change_percentage),
            id = stock.id,
        );
    }
    body.push_str("</table>");

    if !ctx.recent_trades.is_empty() {
        body.push_str("<h2>Recent trades</h2><table><tr><th>Time</th><th>Symbol</th><th>Type</th><th>Qty</th><th>Price</th></tr>");
        for trade in &ctx.recent_trades {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&trade.timestamp),
                escape(&trade.symbol),
                escape(&trade.trade_type),
                trade.quantity,
                money(trade.price),
            );
        }
        body.push_str("</table>");
    }

    body.push_str(QUICK_TRADE_SCRIPT);

    layout("Dashboard", Some(&ctx.username), ctx.flash.as_ref(), &body)
}

const QUICK_TRADE_SCRIPT: &str = r#"<p id="quick-trade-result"></p>
<script>
async function quickTrade(stockId, tradeType) {
  const res = await fetch('/quick_trade', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json', 'X-Requested-With': 'XMLHttpRequest' },
    body: JSON.stringify({ stock_id: stockId, trade_type: tradeType, quantity: 1 })
  });
  const data = await res.json();
  const out = document.getElementById('quick-trade-result');
  out.textContent = data.success ? data.message : data.error;
  if (data.success) { window.location.reload(); }
}
</script>"#;
