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
    domain::{
        parse_booking_date, parse_slot_time, Booking, BookingWithTurf, CreateTurfRequest,
        SlotAvailability, Turf, TurfFilter, UpdateTurfRequest,
    },
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub date: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub turf_id: Uuid,
    pub date: String,
    pub start: String,
    pub end: String,
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct SlotsParams {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub turf_id: Uuid,
    pub date: String,
    pub slots: Vec<SlotAvailability>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TurfFilter>,
) -> Result<Json<Vec<Turf>>> {
    let turfs = state.service_context.turf_service.list_active(&filter).await?;
    Ok(Json(turfs))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Turf>> {
    let turf = state.service_context.turf_service
        .get_active(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Turf not found".to_string()))?;

    Ok(Json(turf))
}

pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityResponse>> {
    let date = parse_booking_date(&params.date)
        .ok_or_else(|| AppError::Validation("date: Date must be YYYY-MM-DD".to_string()))?;
    let start = parse_slot_time(&params.start)
        .ok_or_else(|| AppError::Validation("start: Time must be HH:MM".to_string()))?;
    let end = parse_slot_time(&params.end)
        .ok_or_else(|| AppError::Validation("end: Time must be HH:MM".to_string()))?;

    let available = state.service_context.booking_service
        .check_availability(id, date, start, end)
        .await?;

    Ok(Json(AvailabilityResponse {
        turf_id: id,
        date: date.to_string(),
        start: start.format("%H:%M").to_string(),
        end: end.format("%H:%M").to_string(),
        available,
    }))
}

pub async fn slots(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<SlotsParams>,
) -> Result<Json<SlotsResponse>> {
    let date = parse_booking_date(&params.date)
        .ok_or_else(|| AppError::Validation("date: Date must be YYYY-MM-DD".to_string()))?;

    let slots = state.service_context.booking_service.day_slots(id, date).await;

    Ok(Json(SlotsResponse {
        turf_id: id,
        date: date.to_string(),
        slots,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<CreateTurfRequest>,
) -> Result<(StatusCode, Json<Turf>)> {
    let turf = state.service_context.turf_service.add_turf(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(turf)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTurfRequest>,
) -> Result<Json<Turf>> {
    let turf = state.service_context.turf_service.update_turf(&ctx, id, req).await?;
    Ok(Json(turf))
}

pub async fn set_active(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<Turf>> {
    let turf = state.service_context.turf_service.set_active(&ctx, id, req.active).await?;
    Ok(Json(turf))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.turf_service.delete_turf(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bookings(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Booking>>> {
    let bookings = state.service_context.booking_service.list_for_turf(&ctx, id).await?;
    Ok(Json(bookings))
}

pub async fn owner_turfs(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<Turf>>> {
    let turfs = state.service_context.turf_service.list_by_owner(&ctx).await?;
    Ok(Json(turfs))
}

pub async fn owner_bookings(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<BookingWithTurf>>> {
    let bookings = state.service_context.booking_service.list_for_owner(&ctx).await?;
    Ok(Json(bookings))
}
