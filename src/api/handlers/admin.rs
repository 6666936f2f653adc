use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    auth::AuthContext,
    domain::{BookingStats, BookingWithTurf, Profile, Role, SignUpRequest, Turf},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct ProfileList {
    profiles: Vec<Profile>,
    total: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

pub async fn list_profiles(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> Result<Json<ProfileList>> {
    let profiles = &state.service_context.profile_service;
    let list = profiles.list(&ctx, params.limit, params.offset).await?;
    let total = profiles.count(&ctx).await?;

    Ok(Json(ProfileList { profiles: list, total }))
}

pub async fn set_role(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<Profile>> {
    let profile = state.service_context.profile_service.set_role(&ctx, id, req.role).await?;
    Ok(Json(profile))
}

pub async fn create_turf_owner(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Profile>)> {
    let profile = state.service_context.auth_service.create_turf_owner(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn list_turfs(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<Turf>>> {
    let turfs = state.service_context.turf_service.list_all(&ctx).await?;
    Ok(Json(turfs))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<BookingWithTurf>>> {
    let bookings = state.service_context.booking_service
        .list_all(&ctx, params.limit, params.offset)
        .await?;
    Ok(Json(bookings))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<BookingStats>> {
    let stats = state.service_context.booking_service.stats(&ctx).await?;
    Ok(Json(stats))
}
