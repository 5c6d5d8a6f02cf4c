use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, SignupRequest},
        jwt::Subject,
        password::{hash_password_blocking, verify_dummy_password_blocking, verify_password_blocking},
        repo_types::{NewUser, User},
        session::{cleared_session_cookie, session_cookie, AuthUser},
        validation::{validate_login, validate_signup},
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

/// Signs a session token for `user` and attaches it to `jar`.
fn start_session(state: &AppState, jar: CookieJar, user: &User) -> Result<CookieJar, AppError> {
    let token = state.keys.issue(Subject {
        id: user.id,
        email: &user.email,
        role: user.role,
    })?;
    Ok(jar.add(session_cookie(token, state.config.cookie_secure)))
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    let Json(payload) = payload?;
    let valid = validate_signup(&payload).inspect_err(|e| warn!(error = %e, "signup rejected"))?;

    let password_hash = hash_password_blocking(valid.password).await?;
    let user = state
        .users
        .create_user(NewUser {
            email: valid.email,
            username: valid.username,
            full_name: valid.full_name,
            password_hash,
            profile: valid.profile,
        })
        .await
        .inspect_err(|e| warn!(error = %e, "signup store rejected"))?;

    let jar = start_session(&state, jar, &user)?;
    info!(user_id = %user.id, role = %user.role, "user signed up");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse { user: user.into() }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let Json(payload) = payload?;
    let creds = validate_login(&payload)?;

    // Unknown email and wrong password must be indistinguishable to the client.
    let Some(user) = state.users.find_user_by_email(&creds.email).await? else {
        if let Err(e) = verify_dummy_password_blocking(creds.password).await {
            warn!(error = %e, "dummy password verify failed");
        }
        warn!("login unknown email");
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password_blocking(creds.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let jar = start_session(&state, jar, &user)?;
    info!(user_id = %user.id, "user logged in");
    Ok((jar, Json(AuthResponse { user: user.into() })))
}

#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    (
        StatusCode::NO_CONTENT,
        jar.add(cleared_session_cookie(state.config.cookie_secure)),
    )
}

#[instrument(skip(state, auth), fields(user_id = %auth.id, role = %auth.role))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<AuthResponse>, AppError> {
    // A valid token for a user that no longer exists is still unauthenticated.
    let user = state
        .users
        .find_user_by_id(auth.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(AuthResponse { user: user.into() }))
}
