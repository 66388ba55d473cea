//! Server-side HTML rendering
//!
//! Pages are plain `String`s built from the view models in
//! `crate::models::portfolio`. Every user-supplied or database string goes
//! through [`escape`].

pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod portfolio;
pub mod trade;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use std::fmt::Write;

use crate::models::common::FlashMessage;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #1f2933; }
nav { background: #1f2933; padding: 0.75rem 1.5rem; display: flex; gap: 1rem; align-items: center; }
nav a { color: #e4e7eb; text-decoration: none; }
nav .spacer { flex: 1; }
main { max-width: 1100px; margin: 1.5rem auto; padding: 0 1rem; }
table { width: 100%; border-collapse: collapse; background: #fff; margin-bottom: 1.5rem; }
th, td { padding: 0.5rem 0.75rem; border-bottom: 1px solid #e4e7eb; text-align: left; }
.cards { display: flex; gap: 1rem; flex-wrap: wrap; margin-bottom: 1.5rem; }
.card { background: #fff; padding: 1rem 1.25rem; border-radius: 6px; min-width: 180px; }
.card .label { font-size: 0.8rem; color: #616e7c; }
.card .value { font-size: 1.3rem; font-weight: 600; }
.gain { color: #1f8a4c; }
.loss { color: #c53030; }
.flash { padding: 0.75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.flash.success { background: #def7ec; }
.flash.error { background: #fde8e8; }
.flash.info { background: #e1effe; }
form.stacked label { display: block; margin-top: 0.75rem; }
"#;

/// Escape text for HTML element and attribute content
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

pub fn percent(amount: Decimal) -> String {
    format!("{:.2}%", amount)
}

/// CSS class for a signed amount
pub fn trend_class(amount: Decimal) -> &'static str {
    if amount.is_sign_negative() && !amount.is_zero() {
        "loss"
    } else {
        "gain"
    }
}

/// Signed amount wrapped in a gain/loss span
pub fn signed(amount: Decimal) -> String {
    format!(
        r#"<span class="{}">{}</span>"#,
        trend_class(amount),
        money(amount)
    )
}

fn render_flash(flash: Option<&FlashMessage>) -> String {
    match flash {
        Some(flash) => format!(
            r#"<div class="flash {}">{}</div>"#,
            flash.level,
            escape(&flash.message)
        ),
        None => String::new(),
    }
}

/// Wrap page content with the document shell and navigation
pub fn layout(
    title: &str,
    username: Option<&str>,
    flash: Option<&FlashMessage>,
    body: &str,
) -> String {
    let mut nav = String::new();
    match username {
        Some(username) => {
            let _ = write!(
                nav,
                r#"<a href="/">Dashboard</a><a href="/trade">Trade</a><a href="/portfolio">Portfolio</a><a href="/analytics">Analytics</a><span class="spacer"></span><span style="color:#9aa5b1">{}</span><form method="post" action="/logout" style="margin:0"><button type="submit">Log out</button></form>"#,
                escape(username)
            );
        }
        None => {
            nav.push_str(r#"<span class="spacer"></span><a href="/login">Log in</a><a href="/register">Register</a>"#);
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} · PaperTrade</title>
<style>{STYLE}</style>
</head>
<body>
<nav>{nav}</nav>
<main>
{flash}
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        flash = render_flash(flash),
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1><p>{}</p><p><a href=\"/\">Back to dashboard</a></p>",
        status.as_u16(),
        escape(message)
    );
    layout("Error", None, None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(dec!(9000)), "9000.00");
        assert_eq!(money(dec!(5.263157)), "5.26");
        assert_eq!(percent(dec!(5.263157)), "5.26%");
    }

    #[test]
    fn test_trend_class() {
        assert_eq!(trend_class(dec!(-0.01)), "loss");
        assert_eq!(trend_class(Decimal::ZERO), "gain");
        assert_eq!(trend_class(dec!(12)), "gain");
    }

    #[test]
    fn test_layout_escapes_flash() {
        let flash = FlashMessage::error("<b>nope</b>");
        let html = layout("Trade", Some("alice"), Some(&flash), "<p>body</p>");
        assert!(html.contains("&lt;b&gt;nope&lt;/b&gt;"));
        assert!(html.contains(r#"class="flash error""#));
        assert!(html.contains("<p>body</p>"));
    }
}
