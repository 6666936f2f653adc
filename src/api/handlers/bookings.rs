use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    auth::AuthContext,
    domain::{Booking, BookingWithTurf, CreateBookingRequest},
    error::Result,
};

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>)> {
    let booking = state.service_context.booking_service.create_booking(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<BookingWithTurf>>> {
    let bookings = state.service_context.booking_service.list_mine(&ctx).await?;
    Ok(Json(bookings))
}

pub async fn upcoming(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<BookingWithTurf>>> {
    let bookings = state.service_context.booking_service.upcoming_mine(&ctx).await?;
    Ok(Json(bookings))
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = state.service_context.booking_service.cancel_booking(&ctx, id).await?;
    Ok(Json(booking))
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = state.service_context.booking_service.confirm_payment(&ctx, id).await?;
    Ok(Json(booking))
}

pub async fn fail_payment(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = state.service_context.booking_service.fail_payment(&ctx, id).await?;
    Ok(Json(booking))
}
