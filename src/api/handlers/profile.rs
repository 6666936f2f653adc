use std::convert::Infallible;

use axum::{
    extract::{Extension, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::stream::{self, Stream};

use crate::{
    api::state::AppState,
    auth::AuthContext,
    domain::{Profile, UpdateProfileRequest},
    error::Result,
};

pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Profile>> {
    let profile = state.service_context.profile_service.me(&ctx).await?;
    Ok(Json(profile))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>> {
    let profile = state.service_context.profile_service.update_me(&ctx, req).await?;
    Ok(Json(profile))
}

/// Server-sent events for changes to the caller's own profile. The stream
/// ends when the caller signs out or resets their password.
pub async fn events(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let subscription = state.service_context.profile_events.subscribe(ctx.user_id).await;
    tracing::debug!("Profile event stream opened for {}", ctx.user_id);

    let stream = stream::unfold(subscription, |mut subscription| async move {
        let event = subscription.recv().await?;
        let sse = Event::default()
            .event(event.name())
            .json_data(&event)
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to encode profile event: {}", e);
                Event::default().event("error")
            });
        Some((Ok(sse), subscription))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
