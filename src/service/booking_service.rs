use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use uuid::Uuid;
use validator::Validate;

use super::clock::Clock;
use crate::{
    auth::AuthContext,
    config::BookingConfig,
    domain::*,
    error::{AppError, Result},
    repository::{BookingRepository, TurfRepository},
};

pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    turfs: Arc<dyn TurfRepository>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        turfs: Arc<dyn TurfRepository>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
    ) -> Self {
        Self { bookings, turfs, clock, config }
    }

    /// True when no non-cancelled booking on this turf and date intersects
    /// `[start, end)`. Read-only.
    pub async fn check_availability(
        &self,
        turf_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<bool> {
        if end <= start {
            return Err(AppError::Validation("end_time: End time must be after start time".to_string()));
        }

        let conflicts = self.bookings.find_overlapping(turf_id, date, start, end).await?;
        Ok(conflicts.is_empty())
    }

    /// Every bookable slot of the day with its availability, from a single
    /// query. If the query fails every slot reads as unavailable.
    pub async fn day_slots(&self, turf_id: Uuid, date: NaiveDate) -> Vec<SlotAvailability> {
        let slots = self.slot_grid();

        let taken = match self.bookings.list_active_for_day(turf_id, date).await {
            Ok(bookings) => bookings,
            Err(e) => {
                tracing::warn!("Slot lookup failed for turf {} on {}, reporting all slots taken: {}", turf_id, date, e);
                return slots
                    .into_iter()
                    .map(|(start_time, end_time)| SlotAvailability { start_time, end_time, available: false })
                    .collect();
            }
        };

        let now = self.clock.now();
        slots
            .into_iter()
            .map(|(start_time, end_time)| {
                let started = date.and_time(start_time) <= now;
                let clash = taken.iter().any(|b| b.overlaps(start_time, end_time));
                SlotAvailability { start_time, end_time, available: !started && !clash }
            })
            .collect()
    }

    fn slot_grid(&self) -> Vec<(NaiveTime, NaiveTime)> {
        let Some(minutes) = self.config.slot_length() else {
            tracing::warn!("Invalid slot length {} minutes, no slots offered", self.config.slot_minutes);
            return Vec::new();
        };
        let step = minutes * 60;
        let close = self.config.close_hour.min(24) * 3600;
        let mut start = self.config.open_hour * 3600;
        let mut slots = Vec::new();

        while start + step <= close {
            let (Some(from), Some(to)) = (
                NaiveTime::from_num_seconds_from_midnight_opt(start, 0),
                NaiveTime::from_num_seconds_from_midnight_opt(start + step, 0),
            ) else {
                break;
            };
            slots.push((from, to));
            start += step;
        }

        slots
    }

    /// Checkout. The availability check and the insert are one statement,
    /// so a slot can only be won once.
    pub async fn create_booking(&self, ctx: &AuthContext, request: CreateBookingRequest) -> Result<Booking> {
        request.validate()?;

        let turf_id = Uuid::parse_str(request.turf_id.trim())
            .map_err(|_| AppError::Validation("turf_id: Invalid turf id".to_string()))?;
        let booking_date = parse_booking_date(&request.date)
            .ok_or_else(|| AppError::Validation("date: Date must be YYYY-MM-DD".to_string()))?;
        let start_time = parse_slot_time(&request.time)
            .ok_or_else(|| AppError::Validation("time: Time must be HH:MM".to_string()))?;

        let end_time = match request.end_time.as_deref().map(str::trim) {
            Some(end) if !end.is_empty() => parse_slot_time(end)
                .ok_or_else(|| AppError::Validation("end_time: End time must be HH:MM".to_string()))?,
            _ => {
                let minutes = self
                    .config
                    .slot_length()
                    .ok_or_else(|| AppError::Internal(format!("Invalid slot length: {}", self.config.slot_minutes)))?;
                let (end, wrapped) = start_time.overflowing_add_signed(Duration::minutes(minutes.into()));
                if wrapped != 0 {
                    return Err(AppError::Validation("time: Slot runs past midnight".to_string()));
                }
                end
            }
        };

        if end_time <= start_time {
            return Err(AppError::Validation("end_time: End time must be after start time".to_string()));
        }

        if booking_date.and_time(start_time) <= self.clock.now() {
            return Err(AppError::BadRequest("Cannot book a slot in the past".to_string()));
        }

        let turf = self
            .turfs
            .find_by_id(turf_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| AppError::NotFound("Turf not found".to_string()))?;

        let (status, payment_status) = request.payment_method.initial_state();

        let booking = self
            .bookings
            .create_if_available(NewBooking {
                user_id: ctx.user_id,
                turf_id: turf.id,
                booking_date,
                start_time,
                end_time,
                total_price: request.price,
                status,
                payment_status,
                payment_method: request.payment_method,
            })
            .await?
            .ok_or_else(|| {
                tracing::info!(
                    "Slot {} {}-{} on turf {} already taken",
                    booking_date,
                    start_time.format("%H:%M"),
                    end_time.format("%H:%M"),
                    turf.id
                );
                AppError::Conflict("This slot is no longer available".to_string())
            })?;

        tracing::info!(
            "Booking {} created by {} for turf {} on {} {} ({:?})",
            booking.id,
            ctx.user_id,
            turf.id,
            booking_date,
            start_time.format("%H:%M"),
            booking.status
        );

        Ok(booking)
    }

    pub async fn list_mine(&self, ctx: &AuthContext) -> Result<Vec<BookingWithTurf>> {
        self.bookings.list_by_user(ctx.user_id).await
    }

    pub async fn upcoming_mine(&self, ctx: &AuthContext) -> Result<Vec<BookingWithTurf>> {
        self.bookings
            .list_upcoming_by_user(ctx.user_id, self.clock.today())
            .await
    }

    /// Customer cancellation: own bookings only, and only while the start
    /// is at least `cancellation_window_hours` away. The row is kept.
    pub async fn cancel_booking(&self, ctx: &AuthContext, id: Uuid) -> Result<Booking> {
        // Re-read so a stale or forged client copy cannot be cancelled
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.user_id != ctx.user_id {
            tracing::warn!("User {} tried to cancel booking {} owned by {}", ctx.user_id, id, booking.user_id);
            return Err(AppError::Forbidden("You can only cancel your own bookings".to_string()));
        }

        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(AppError::Conflict("Booking is already cancelled".to_string()));
        }

        let window = self.config.cancellation_window_hours;
        if !can_cancel(booking.booking_date, booking.start_time, self.clock.now(), window) {
            return Err(AppError::BadRequest(format!(
                "Bookings can only be cancelled at least {} hours before the start time",
                window
            )));
        }

        let cancelled = self
            .bookings
            .update_status(
                id,
                (booking.status, booking.payment_status),
                (BookingStatus::Cancelled, booking.payment_status),
            )
            .await?;

        tracing::info!("Booking {} cancelled by {}", id, ctx.user_id);
        Ok(cancelled)
    }

    /// Settles a pay-at-venue booking.
    pub async fn confirm_payment(&self, ctx: &AuthContext, id: Uuid) -> Result<Booking> {
        let booking = self.settleable_booking(ctx, id).await?;

        let status_ok = booking.status == BookingStatus::Confirmed
            || booking.status.can_transition_to(BookingStatus::Confirmed);
        if !status_ok || !booking.payment_status.can_transition_to(PaymentStatus::Paid) {
            return Err(AppError::Conflict(format!(
                "Cannot confirm payment for a {:?} booking with {:?} payment",
                booking.status, booking.payment_status
            ).to_lowercase()));
        }

        let updated = self
            .bookings
            .update_status(
                id,
                (booking.status, booking.payment_status),
                (BookingStatus::Confirmed, PaymentStatus::Paid),
            )
            .await?;

        tracing::info!("Payment for booking {} confirmed by {}", id, ctx.user_id);
        Ok(updated)
    }

    pub async fn fail_payment(&self, ctx: &AuthContext, id: Uuid) -> Result<Booking> {
        let booking = self.settleable_booking(ctx, id).await?;

        if booking.is_cancelled() || !booking.payment_status.can_transition_to(PaymentStatus::Failed) {
            return Err(AppError::Conflict(format!(
                "Cannot fail payment for a {:?} booking with {:?} payment",
                booking.status, booking.payment_status
            ).to_lowercase()));
        }

        let updated = self
            .bookings
            .update_status(
                id,
                (booking.status, booking.payment_status),
                (booking.status, PaymentStatus::Failed),
            )
            .await?;

        tracing::info!("Payment for booking {} marked failed by {}", id, ctx.user_id);
        Ok(updated)
    }

    async fn settleable_booking(&self, ctx: &AuthContext, id: Uuid) -> Result<Booking> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        self.ensure_manages_turf(ctx, booking.turf_id).await?;
        Ok(booking)
    }

    pub async fn list_for_turf(&self, ctx: &AuthContext, turf_id: Uuid) -> Result<Vec<Booking>> {
        self.ensure_manages_turf(ctx, turf_id).await?;
        self.bookings.list_by_turf(turf_id).await
    }

    /// Bookings across every turf the caller owns.
    pub async fn list_for_owner(&self, ctx: &AuthContext) -> Result<Vec<BookingWithTurf>> {
        if !ctx.role().can_manage_turfs() {
            return Err(AppError::Forbidden("Only turf owners can view turf bookings".to_string()));
        }
        self.bookings.list_by_owner(ctx.user_id).await
    }

    pub async fn list_all(&self, ctx: &AuthContext, limit: i64, offset: i64) -> Result<Vec<BookingWithTurf>> {
        if !ctx.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        self.bookings.list_all(limit, offset).await
    }

    pub async fn stats(&self, ctx: &AuthContext) -> Result<BookingStats> {
        if !ctx.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        self.bookings.stats().await
    }

    async fn ensure_manages_turf(&self, ctx: &AuthContext, turf_id: Uuid) -> Result<()> {
        if ctx.is_admin() {
            return Ok(());
        }

        let turf = self
            .turfs
            .find_by_id(turf_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Turf not found".to_string()))?;

        if turf.owner_id != ctx.user_id {
            return Err(AppError::Forbidden("You do not manage this turf".to_string()));
        }

        Ok(())
    }
}
