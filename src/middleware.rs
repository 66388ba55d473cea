//! Login-required middleware and session cookie helpers

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

use crate::services::auth::{self, SESSION_COOKIE};
use crate::AppState;

/// Paths reachable without a session
const OPEN_PATHS: [&str; 3] = ["/login", "/register", "/logout"];

const ADMIN_PREFIX: &str = "/admin/";

pub fn is_exempt(path: &str) -> bool {
    OPEN_PATHS.contains(&path) || path.starts_with(ADMIN_PREFIX)
}

/// Attach the session's user to the request, or redirect to the login page
///
/// Unauthenticated requests for anything but the open paths are sent to
/// `/login?next=<path>`.
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let user = match read_cookie(request.headers(), SESSION_COOKIE) {
        Some(token) => match auth::find_session_user(&state.db, &token).await {
            Ok(user) => user,
            Err(e) => {
                error!(path = %path, error = %e, "Session lookup failed");
                None
            }
        },
        None => None,
    };

    match user {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None if is_exempt(&path) => next.run(request).await,
        None => Redirect::to(&format!("/login?next={}", path)).into_response(),
    }
}

/// Value of cookie `name` from the `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn cleared_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
