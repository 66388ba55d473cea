use axum::{extract::State, response::Html, Extension};

use crate::error::AppError;
use crate::services::auth::{self, CurrentUser};
use crate::services::portfolio;
use crate::templates;
use crate::AppState;

// GET /portfolio
pub async fn portfolio_view(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, AppError> {
    let mut ctx = portfolio::portfolio_context(&state.db, &user).await?;
    ctx.flash = auth::take_flash(&state.db, user.session_id).await?;

    Ok(Html(templates::portfolio::render(&ctx)))
}
