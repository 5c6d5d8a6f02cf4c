use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::session::session_token;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";

/// `path` is `prefix` itself or lies below it (`/dashboard`, `/dashboard/map`,
/// but not `/dashboards`).
pub fn is_protected(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        path.strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

pub fn login_redirect(from: &str) -> String {
    format!("{LOGIN_PATH}?from={}", urlencoding::encode(from))
}

/// Redirects unauthenticated requests under protected prefixes to the login
/// page. Everything else passes through untouched.
pub async fn require_session(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    if !is_protected(&path, &state.config.protected_prefixes) {
        return next.run(req).await;
    }

    let jar = CookieJar::from_headers(req.headers());
    let authenticated = session_token(&jar, req.headers())
        .is_some_and(|token| state.keys.verify(&token).is_ok());

    if authenticated {
        next.run(req).await
    } else {
        debug!(%path, "unauthenticated request to protected path");
        Redirect::temporary(&login_redirect(&path)).into_response()
    }
}
