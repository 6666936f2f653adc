use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::{AuthContext, SESSION_COOKIE},
    domain::Role,
    error::{AppError, Result},
    service::access::{self, AccessDecision},
};

/// Resolves the caller's context from the session cookie. Store errors are
/// logged and read as "not signed in".
pub async fn current_context(state: &AppState, jar: &CookieJar) -> Option<AuthContext> {
    let token = jar.get(SESSION_COOKIE)?;

    match state.service_context.auth_service.load_context(token.value()).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::warn!("Session lookup failed: {}", e);
            None
        }
    }
}

/// The role gate for API routes: a login redirect becomes 401, a home
/// redirect becomes 403.
async fn api_access(state: &AppState, jar: &CookieJar, allowed: &[Role]) -> Result<AuthContext> {
    let ctx = current_context(state, jar).await;

    match access::gate(ctx.is_some(), ctx.as_ref().map(|c| c.role()), allowed) {
        AccessDecision::Render => ctx.ok_or(AppError::Unauthorized),
        AccessDecision::RedirectLogin => Err(AppError::Unauthorized),
        AccessDecision::RedirectHome(_) => Err(AppError::Forbidden("You do not have access to this resource".to_string())),
    }
}

/// The role gate for pages. The role is looked up separately from the
/// session so a missing profile or failed lookup sends the caller to login.
pub async fn page_access(
    state: &AppState,
    jar: &CookieJar,
    allowed: &[Role],
) -> std::result::Result<AuthContext, Redirect> {
    let auth = &state.service_context.auth_service;

    let session = match jar.get(SESSION_COOKIE) {
        Some(cookie) => auth.validate_session(cookie.value()).await.unwrap_or_else(|e| {
            tracing::warn!("Session lookup failed: {}", e);
            None
        }),
        None => None,
    };

    let role = match &session {
        Some(session) => state
            .service_context
            .profile_repo
            .find_role(session.user_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Role lookup failed for {}: {}", session.user_id, e);
                None
            }),
        None => None,
    };

    let decision = access::gate(session.is_some(), role, allowed);
    if let Some(path) = decision.redirect_path() {
        return Err(Redirect::to(path));
    }

    let Some(session) = session else {
        return Err(Redirect::to(access::LOGIN_PATH));
    };

    match state.service_context.profile_repo.find_by_id(session.user_id).await {
        Ok(Some(profile)) => Ok(AuthContext::new(session.id, profile)),
        Ok(None) => Err(Redirect::to(access::LOGIN_PATH)),
        Err(e) => {
            tracing::warn!("Profile lookup failed for {}: {}", session.user_id, e);
            Err(Redirect::to(access::LOGIN_PATH))
        }
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let ctx = api_access(&state, &jar, &[]).await?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

pub async fn require_turf_manager(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let ctx = api_access(&state, &jar, access::TURF_MANAGERS).await?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let ctx = api_access(&state, &jar, access::ADMIN_ONLY).await?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
