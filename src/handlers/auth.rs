//! Login, registration and logout pages

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tracing::{error, info};

use crate::error::AuthError;
use crate::middleware::{cleared_session_cookie, read_cookie, session_cookie};
use crate::models::auth::{LoginForm, LoginQuery, RegisterForm};
use crate::services::auth::{self, SESSION_COOKIE};
use crate::templates;
use crate::AppState;

// GET /login
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let next = auth::safe_next(query.next.as_deref());
    Html(templates::auth::login(&next, None))
}

// POST /login
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let next = auth::safe_next(form.next.as_deref());

    let user = match auth::authenticate(&state.db, form.username.trim(), &form.password).await {
        Ok(user) => user,
        Err(e) => {
            let page = templates::auth::login(&next, Some(&e.to_string()));
            return auth_failure(StatusCode::UNAUTHORIZED, page, e);
        }
    };

    start_session(&state, user.id, &next).await
}

// GET /register
pub async fn register_page() -> Html<String> {
    Html(templates::auth::register("", None))
}

// POST /register
pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let username = form.username.trim().to_string();

    let registered = match auth::validate_password(&form.password, &form.password_confirm) {
        Ok(()) => {
            let balance = state.config.starting_balance;
            auth::register_user(&state.db, &username, &form.password, balance).await
        }
        Err(e) => Err(e),
    };

    match registered {
        Ok(user) => start_session(&state, user.id, "/").await,
        Err(e) => {
            let status = match e {
                AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            auth_failure(status, templates::auth::register(&username, Some(&e.to_string())), e)
        }
    }
}

// GET|POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = read_cookie(&headers, SESSION_COOKIE) {
        if let Err(e) = auth::delete_session(&state.db, &token).await {
            error!(error = %e, "Failed to delete session");
        }
    }

    (
        [(header::SET_COOKIE, cleared_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

async fn start_session(state: &AppState, user_id: i32, next: &str) -> Response {
    match auth::create_session(&state.db, user_id, state.config.session_ttl_hours).await {
        Ok(session) => {
            info!(user_id, "User logged in");
            let cookie = session_cookie(
                &session.token,
                state.config.session_ttl_hours * 3600,
                state.config.secure_cookies,
            );
            ([(header::SET_COOKIE, cookie)], Redirect::to(next)).into_response()
        }
        Err(e) => {
            error!(user_id, error = %e, "Failed to create session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(templates::error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not start a session",
                )),
            )
                .into_response()
        }
    }
}

fn auth_failure(status: StatusCode, page: String, e: AuthError) -> Response {
    if let AuthError::Database(db_err) = &e {
        error!(error = %db_err, "Authentication failed on database error");
    }
    (status, Html(page)).into_response()
}
