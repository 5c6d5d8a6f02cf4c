use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    claims::Claims,
    jwt::{SessionKeys, SESSION_TTL},
    repo_types::Role,
};
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "insurmap_session";

/// Session cookie carrying `token`, valid for the whole session lifetime.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(SESSION_TTL)
        .build()
}

/// Expired, empty session cookie; browsers drop the session on receipt.
pub fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Session token from the cookie, or from `Authorization: Bearer` for
/// non-browser clients.
pub fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(c) = jar.get(SESSION_COOKIE) {
        if !c.value().is_empty() {
            return Some(c.value().to_string());
        }
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Verified caller identity. Rejects with a generic 401 whatever the cause.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(c: Claims) -> Self {
        Self {
            id: c.sub,
            role: c.role,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar, &parts.headers).ok_or(AppError::Unauthorized)?;

        match keys.verify(&token) {
            Ok(claims) => {
                debug!(user_id = %claims.sub, email = %claims.email, "session verified");
                Ok(claims.into())
            }
            Err(e) => {
                warn!(error = %e, "invalid or expired session token");
                Err(AppError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let c = session_cookie("tok".into(), true);
        assert_eq!(c.name(), SESSION_COOKIE);
        assert_eq!(c.value(), "tok");
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.secure(), Some(true));
        assert_eq!(c.same_site(), Some(SameSite::Lax));
        assert_eq!(c.path(), Some("/"));
        assert_eq!(c.max_age(), Some(SESSION_TTL));

        let header = c.to_string();
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Max-Age=604800"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let c = cleared_session_cookie(false);
        assert_eq!(c.value(), "");
        assert_eq!(c.max_age(), Some(time::Duration::ZERO));
        assert_eq!(c.secure(), Some(false));
    }

    #[test]
    fn auth_user_carries_subject_and_role() {
        let id = Uuid::new_v4();
        let user = AuthUser::from(Claims {
            sub: id,
            email: "jane@acme.io".into(),
            role: Role::Broker,
            iat: 0,
            exp: 1,
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
        });
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Broker);
    }

    #[test]
    fn token_prefers_cookie_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("other=1; insurmap_session=from-cookie"),
        );
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(session_token(&jar, &headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn token_falls_back_to_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(session_token(&jar, &headers).as_deref(), Some("abc.def.ghi"));

        let empty = HeaderMap::new();
        assert_eq!(session_token(&CookieJar::from_headers(&empty), &empty), None);
    }
}
