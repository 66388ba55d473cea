use axum::{extract::State, response::Html, Extension};

use crate::error::AppError;
use crate::services::auth::{self, CurrentUser};
use crate::services::portfolio;
use crate::templates;
use crate::AppState;

// GET /
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, AppError> {
    let mut ctx = portfolio::dashboard_context(&state.db, &user).await?;
    ctx.flash = auth::take_flash(&state.db, user.session_id).await?;

    Ok(Html(templates::dashboard::render(&ctx)))
}
