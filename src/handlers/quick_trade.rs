use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::warn;

use crate::error::TradeError;
use crate::models::trade::{QuickTradeRequest, QuickTradeResponse, TradeSide};
use crate::services::auth::CurrentUser;
use crate::services::{portfolio, trading};
use crate::AppState;

/// Quick trade endpoint used by the dashboard buttons
///
/// POST /quick_trade
///
/// # Request Body
///
/// ```json
/// { "stock_id": 1, "trade_type": "BUY", "quantity": 1 }
/// ```
///
/// `quantity` defaults to 1.
///
/// # Response
///
/// ```json
/// { "success": true, "message": "Successfully bought 1 shares of NABIL", "new_balance": 9000.0 }
/// ```
///
/// Sells also carry `profit_loss`. Every failure, including malformed
/// payloads and database errors, is answered with `400` and
/// `{ "success": false, "error": "...", "new_balance": 10000.0 }`, where
/// `new_balance` is the unchanged balance and is left out if it cannot be read.
pub async fn quick_trade(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<QuickTradeRequest>, JsonRejection>,
) -> (StatusCode, Json<QuickTradeResponse>) {
    let outcome = match payload {
        Ok(Json(req)) => match req.trade_type.parse::<TradeSide>() {
            Ok(side) => {
                trading::place_trade(&state.db, user.id, req.stock_id, side, req.quantity).await
            }
            Err(e) => Err(TradeError::InvalidRequest(e)),
        },
        Err(rejection) => Err(TradeError::InvalidRequest(rejection.body_text())),
    };

    match outcome {
        Ok(receipt) => (
            StatusCode::OK,
            Json(QuickTradeResponse::executed(
                receipt.message(),
                receipt.new_balance,
                receipt.realized_profit_loss,
            )),
        ),
        Err(e) => {
            warn!(user_id = user.id, error = %e, "Quick trade failed");
            let balance = portfolio::load_balance(&state.db, user.id).await.ok();
            (
                StatusCode::BAD_REQUEST,
                Json(QuickTradeResponse::failed(e.to_string(), balance)),
            )
        }
    }
}
