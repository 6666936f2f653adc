use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use serde_json::json;

use crate::{
    api::{middleware::auth::page_access, state::AppState},
    domain::{BookingStats, BookingStatus, BookingWithTurf, PaymentStatus, Profile, Turf},
    error::Result,
    service::access,
};

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub profile: Profile,
    pub users: i64,
    pub turfs: i64,
    pub bookings: BookingStats,
}

#[derive(Debug, Serialize)]
pub struct OwnerDashboard {
    pub profile: Profile,
    pub turfs: Vec<Turf>,
    pub bookings: Vec<BookingWithTurf>,
    pub pending_payments: usize,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct CustomerHome {
    pub profile: Profile,
    pub upcoming: Vec<BookingWithTurf>,
}

/// Sends a signed-in user to their role's landing page.
pub async fn dashboard(State(state): State<AppState>, jar: CookieJar) -> Redirect {
    match page_access(&state, &jar, &[]).await {
        Ok(ctx) => Redirect::to(ctx.role().landing_path()),
        Err(redirect) => redirect,
    }
}

pub async fn admin_dashboard(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let ctx = match page_access(&state, &jar, access::ADMIN_ONLY).await {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let services = &state.service_context;
    let users = services.profile_service.count(&ctx).await?;
    let turfs = services.turf_repo.count().await?;
    let bookings = services.booking_service.stats(&ctx).await?;

    Ok(Json(AdminDashboard { profile: ctx.profile, users, turfs, bookings }).into_response())
}

pub async fn owner_dashboard(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let ctx = match page_access(&state, &jar, access::TURF_MANAGERS).await {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let services = &state.service_context;
    let turfs = services.turf_service.list_by_owner(&ctx).await?;
    let bookings = services.booking_service.list_for_owner(&ctx).await?;

    let pending_payments = bookings
        .iter()
        .filter(|b| b.booking.status == BookingStatus::Pending && b.booking.payment_status != PaymentStatus::Paid)
        .count();
    let revenue = bookings
        .iter()
        .filter(|b| b.booking.payment_status == PaymentStatus::Paid && !b.booking.is_cancelled())
        .map(|b| b.booking.total_price)
        .sum();

    Ok(Json(OwnerDashboard {
        profile: ctx.profile,
        turfs,
        bookings,
        pending_payments,
        revenue,
    })
    .into_response())
}

pub async fn customer_home(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let ctx = match page_access(&state, &jar, access::CUSTOMERS).await {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let upcoming = state.service_context.booking_service.upcoming_mine(&ctx).await?;

    Ok(Json(CustomerHome { profile: ctx.profile, upcoming }).into_response())
}

pub async fn login_page() -> impl IntoResponse {
    Json(json!({
        "login": "/auth/login",
        "signup": "/auth/signup",
        "password_reset": "/auth/password-reset"
    }))
}
