use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::{
    api::{middleware::auth::current_context, state::AppState},
    auth::{AuthContext, AuthService},
    domain::{PasswordResetConfirm, PasswordResetRequest, Profile, SignInRequest, SignUpRequest},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub profile: Profile,
    pub redirect_to: &'static str,
}

impl From<Profile> for SessionResponse {
    fn from(profile: Profile) -> Self {
        Self {
            redirect_to: profile.role.landing_path(),
            profile,
        }
    }
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Profile>)> {
    let profile = state.service_context.auth_service.sign_up(req).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let auth = &state.service_context.auth_service;
    let (profile, token) = auth.sign_in(req).await?;

    Ok((jar.add(auth.create_session_cookie(&token)), Json(profile.into())))
}

/// Always clears the cookie; ends the session if there was one.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(ctx) = current_context(&state, &jar).await {
        state.service_context.auth_service.sign_out(ctx).await?;
    }

    Ok((jar.add(AuthService::create_logout_cookie()), StatusCode::NO_CONTENT))
}

pub async fn session(Extension(ctx): Extension<AuthContext>) -> Json<SessionResponse> {
    Json(ctx.profile.into())
}

pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> Result<StatusCode> {
    state.service_context.auth_service.request_password_reset(req).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> Result<StatusCode> {
    state.service_context.auth_service.reset_password(req).await?;
    Ok(StatusCode::NO_CONTENT)
}
