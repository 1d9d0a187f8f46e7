//! Account handlers: register, login, logout and the current session.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use jobboard_models::{PublicUser, Role, User, UserId};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::metrics;
use crate::services::Credentials;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: PublicUser,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: SessionUser,
}

/// Set the session cookie and describe the signed-in user.
fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
    status: StatusCode,
) -> ApiResult<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let token = state.tokens.issue(user)?;
    let jar = jar.add(state.tokens.session_cookie(token));
    let message = if status == StatusCode::CREATED {
        "User registered"
    } else {
        "Authenticated"
    };

    Ok((
        status,
        jar,
        Json(SessionResponse {
            success: true,
            message,
            user: user.public(),
        }),
    ))
}

/// POST /api/v1/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> ApiResult<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let user = state.user_service.register(credentials).await?;
    start_session(&state, jar, &user, StatusCode::CREATED)
}

/// POST /api/v1/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> ApiResult<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let user = state.user_service.login(credentials).await?;
    start_session(&state, jar, &user, StatusCode::OK)
}

/// POST /api/v1/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    metrics::record_auth_event("logout", "success");
    (
        jar.add(state.tokens.removal_cookie()),
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully",
        }),
    )
}

/// GET /api/v1/me
pub async fn me(user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        user: SessionUser {
            id: user.id,
            email: user.email,
            role: user.role,
        },
    })
}
