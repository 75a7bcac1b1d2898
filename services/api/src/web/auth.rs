//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for lecturer signup, login, logout and profile.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use seminar_core::{AuthSession, NewLecturer, SessionUser};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::config::Config;
use crate::web::middleware::session_token;
use crate::web::rest::service_error;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub department: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub email: String,
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub email: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
}

fn session_cookie(config: &Config, token: &str, max_age: Duration) -> String {
    let secure = if config.secure_cookies { " Secure;" } else { "" };
    format!(
        "session={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        token,
        secure,
        max_age.max(Duration::zero()).num_seconds()
    )
}

fn open_cookie(config: &Config, session: &AuthSession) -> String {
    session_cookie(config, &session.token, session.expires_at - Utc::now())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new lecturer account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created and session opened", body = AuthResponse),
        (status = 400, description = "Missing email, name or password"),
        (status = 409, description = "An account with this email already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = state
        .accounts
        .signup(NewLecturer {
            email: req.email,
            name: req.name,
            designation: req.designation,
            department: req.department,
            password: req.password,
        })
        .await
        .map_err(service_error)?;

    let cookie = open_cookie(&state.config, &session);
    let response = AuthResponse {
        email: session.user.email,
        name: session.user.name,
    };
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /auth/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = state
        .accounts
        .login(&req.email, &req.password)
        .await
        .map_err(service_error)?;
    info!("{} logged in", session.user.email);

    let cookie = open_cookie(&state.config, &session);
    let response = AuthResponse {
        email: session.user.email,
        name: session.user.name,
    };
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout - Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let token = session_token(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state.accounts.logout(token).await.map_err(service_error)?;

    let cookie = session_cookie(&state.config, "", Duration::zero());
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

/// GET /me - The signed-in lecturer's profile
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile of the signed-in lecturer", body = ProfileResponse),
        (status = 401, description = "No active session")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let lecturer = state
        .accounts
        .profile(&user.email)
        .await
        .map_err(service_error)?;
    Ok(Json(ProfileResponse {
        email: lecturer.email,
        name: lecturer.name,
        designation: lecturer.designation,
        department: lecturer.department,
        created_at: lecturer.created_at,
    }))
}
