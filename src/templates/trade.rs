use std::fmt::Write;

use super::{escape, layout, money};
use crate::models::portfolio::TradePageContext;
use crate::models::trade::TradeSide;

pub fn render(ctx: &TradePageContext) -> String {
    let selected_id = ctx.selected_stock.as_ref().map(|s| s.id);
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<h1>Place a trade</h1><p>Cash balance: <strong>{}</strong></p>
<form class="stacked" method="post" action="/trade">
<label for="stock">Stock</label>
<select name="stock" id="stock">"#,
        money(ctx.balance)
    );

    for stock in &ctx.stocks {
        let selected = if Some(stock.id) == selected_id { " selected" } else { "" };
        let _ = write!(
            body,
            r#"<option value="{}"{}>{} - {} (Rs.{})</option>"#,
            stock.id,
            selected,
            escape(&stock.symbol),
            escape(&stock.name),
            money(stock.current_price),
        );
    }

    body.push_str(r#"</select><label for="trade_type">Type</label><select name="trade_type" id="trade_type">"#);
    for side in [TradeSide::Buy, TradeSide::Sell] {
        let _ = write!(body, r#"<option value="{}">{}</option>"#, side.as_str(), side.label());
    }
    body.push_str(
        r#"</select><label for="quantity">Quantity</label><input type="number" name="quantity" id="quantity" min="1" value="1"><p><button type="submit">Submit order</button></p></form>"#,
    );

    if !ctx.holdings.is_empty() {
        body.push_str("<h2>Your holdings</h2><table><tr><th>Symbol</th><th>Qty</th><th>Avg price</th></tr>");
        for holding in &ctx.holdings {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&holding.symbol),
                holding.quantity,
                money(holding.average_buy_price),
            );
        }
        body.push_str("</table>");
    }

    layout("Trade", Some(&ctx.username), ctx.flash.as_ref(), &body)
}
