//! Trade entry page
//!
//! GET renders the order form, optionally pre-selecting `?stock=SYMBOL`.
//! POST executes the order and redirects with a flash message: to the
//! dashboard on success, back to the form on failure.

use axum::{
    extract::{rejection::FormRejection, Query, State},
    response::{Html, Redirect},
    Extension, Form,
};
use tracing::warn;

use crate::error::{AppError, TradeError};
use crate::models::common::FlashMessage;
use crate::models::trade::{TradeForm, TradePageQuery, TradeSide};
use crate::services::auth::{self, CurrentUser};
use crate::services::{portfolio, trading};
use crate::templates;
use crate::AppState;

// GET /trade
pub async fn trade_page(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<TradePageQuery>,
) -> Result<Html<String>, AppError> {
    let mut ctx = portfolio::trade_page_context(&state.db, &user, query.stock.as_deref()).await?;
    ctx.flash = auth::take_flash(&state.db, user.session_id).await?;

    Ok(Html(templates::trade::render(&ctx)))
}

// POST /trade
pub async fn submit_trade(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    form: Result<Form<TradeForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = match form {
        Ok(Form(form)) => match form.trade_type.parse::<TradeSide>() {
            Ok(side) => {
                trading::place_trade(&state.db, user.id, form.stock, side, form.quantity).await
            }
            Err(e) => Err(TradeError::InvalidRequest(e)),
        },
        Err(rejection) => Err(TradeError::InvalidRequest(rejection.body_text())),
    };

    match outcome {
        Ok(receipt) => {
            let flash = FlashMessage::success(receipt.message());
            auth::set_flash(&state.db, user.session_id, flash).await?;
            Ok(Redirect::to("/"))
        }
        Err(e) => {
            warn!(user_id = user.id, error = %e, "Trade form rejected");
            auth::set_flash(&state.db, user.session_id, FlashMessage::error(e.to_string())).await?;
            Ok(Redirect::to("/trade"))
        }
    }
}
