use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::TurfSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub turf_id: Uuid,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Half-open interval intersection: `[start, end)` against this booking.
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        intervals_overlap(self.start_time, self.end_time, start, end)
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.booking_date.and_time(self.start_time)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingWithTurf {
    #[serde(flatten)]
    pub booking: Booking,
    pub turf: TurfSummary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// pending -> confirmed -> cancelled, pending -> cancelled. Cancelled is terminal.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// A failed payment may still be settled later; paid is terminal.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Failed, PaymentStatus::Paid)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Upi,
    #[serde(alias = "pay_at_venue")]
    Venue,
}

impl PaymentMethod {
    /// Card and UPI settle at checkout; pay-at-venue waits for the owner.
    pub fn initial_state(&self) -> (BookingStatus, PaymentStatus) {
        match self {
            PaymentMethod::Card | PaymentMethod::Upi => (BookingStatus::Confirmed, PaymentStatus::Paid),
            PaymentMethod::Venue => (BookingStatus::Pending, PaymentStatus::Pending),
        }
    }
}

/// Checkout payload as sent by a client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, message = "Turf is required"))]
    pub turf_id: String,
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "Time is required"))]
    pub time: String,
    /// Defaults to one slot after `time`.
    pub end_time: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be positive"))]
    pub price: f64,
    pub payment_method: PaymentMethod,
}

/// A validated booking ready for the conditional insert.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub turf_id: Uuid,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
}

/// Aggregate numbers for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BookingStats {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub cancelled: i64,
    pub paid_revenue: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotAvailability {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub available: bool,
}

pub fn intervals_overlap(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && a_end > b_start
}

pub fn parse_booking_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Accepts `HH:MM` and `HH:MM:SS`. Seconds are dropped; slots are minute-grained.
pub fn parse_slot_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
        .and_then(|t| NaiveTime::from_hms_opt(t.hour(), t.minute(), 0))
}

/// Hours from `now` until the booking starts; negative once it has started.
pub fn hours_until(booking_date: NaiveDate, start_time: NaiveTime, now: NaiveDateTime) -> f64 {
    let starts_at = booking_date.and_time(start_time);
    (starts_at - now).num_seconds() as f64 / 3600.0
}

pub fn can_cancel(booking_date: NaiveDate, start_time: NaiveTime, now: NaiveDateTime, window_hours: i64) -> bool {
    hours_until(booking_date, start_time, now) >= window_hours as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        parse_booking_date(date).unwrap().and_time(parse_slot_time(time).unwrap())
    }

    #[test]
    fn cancellation_rejected_inside_window() {
        let date = parse_booking_date("2024-05-20").unwrap();
        let start = parse_slot_time("18:00").unwrap();
        let now = at("2024-05-20", "07:00");

        assert_eq!(hours_until(date, start, now), 11.0);
        assert!(!can_cancel(date, start, now, 12));
    }

    #[test]
    fn cancellation_accepted_outside_window() {
        let date = parse_booking_date("2024-05-20").unwrap();
        let start = parse_slot_time("18:00").unwrap();
        let now = at("2024-05-19", "05:00");

        assert_eq!(hours_until(date, start, now), 37.0);
        assert!(can_cancel(date, start, now, 12));
    }

    #[test]
    fn cancellation_boundary_is_inclusive() {
        let date = parse_booking_date("2024-05-20").unwrap();
        let start = parse_slot_time("18:00").unwrap();

        assert!(can_cancel(date, start, at("2024-05-20", "06:00"), 12));
        assert!(!can_cancel(date, start, at("2024-05-20", "06:01"), 12));
    }

    #[test]
    fn half_open_overlap() {
        let t = |s: &str| parse_slot_time(s).unwrap();

        assert!(intervals_overlap(t("18:00"), t("19:00"), t("18:30"), t("19:30")));
        assert!(intervals_overlap(t("18:00"), t("20:00"), t("18:30"), t("19:00")));
        // Touching edges do not conflict
        assert!(!intervals_overlap(t("18:00"), t("19:00"), t("19:00"), t("20:00")));
        assert!(!intervals_overlap(t("18:00"), t("19:00"), t("17:00"), t("18:00")));
    }

    #[test]
    fn booking_status_transitions() {
        use BookingStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn payment_status_transitions() {
        use PaymentStatus::*;

        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Failed));
        assert!(!Paid.can_transition_to(Pending));
    }

    #[test]
    fn initial_state_follows_payment_method() {
        assert_eq!(PaymentMethod::Card.initial_state(), (BookingStatus::Confirmed, PaymentStatus::Paid));
        assert_eq!(PaymentMethod::Upi.initial_state(), (BookingStatus::Confirmed, PaymentStatus::Paid));
        assert_eq!(PaymentMethod::Venue.initial_state(), (BookingStatus::Pending, PaymentStatus::Pending));
    }

    #[test]
    fn venue_accepts_long_form_name() {
        let method: PaymentMethod = serde_json::from_str("\"pay_at_venue\"").unwrap();
        assert_eq!(method, PaymentMethod::Venue);
    }

    #[test]
    fn slot_times_parse_with_or_without_seconds() {
        assert_eq!(parse_slot_time("18:00"), NaiveTime::from_hms_opt(18, 0, 0));
        assert_eq!(parse_slot_time("07:30:45"), NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(parse_slot_time("25:00"), None);
        assert_eq!(parse_slot_time(""), None);
        assert_eq!(parse_booking_date("2024-02-30"), None);
    }
}
