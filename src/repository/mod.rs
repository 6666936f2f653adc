use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;
use crate::domain::*;
use crate::error::{AppError, Result};

pub mod booking_repository;
pub mod profile_repository;
pub mod turf_repository;

pub use booking_repository::SqliteBookingRepository;
pub use profile_repository::SqliteProfileRepository;
pub use turf_repository::SqliteTurfRepository;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Inserts the identity and its profile atomically.
    async fn create_account(&self, account: NewAccount) -> Result<Profile>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>>;
    async fn find_role(&self, id: Uuid) -> Result<Option<Role>>;
    /// `(user id, password hash)` for sign-in.
    async fn find_credentials(&self, email: &str) -> Result<Option<(Uuid, String)>>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Profile>>;
    async fn update(&self, id: Uuid, update: UpdateProfileRequest) -> Result<Profile>;
    async fn set_role(&self, id: Uuid, role: Role) -> Result<Profile>;
    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait TurfRepository: Send + Sync {
    async fn create(&self, turf: NewTurf) -> Result<Turf>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Turf>>;
    async fn list_active(&self, filter: &TurfFilter) -> Result<Vec<Turf>>;
    async fn list_all(&self) -> Result<Vec<Turf>>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Turf>>;
    async fn update(&self, id: Uuid, update: UpdateTurfRequest) -> Result<Turf>;
    async fn set_active(&self, id: Uuid, active: bool) -> Result<Turf>;
    /// Deletes the turf unless a non-cancelled booking references it, in
    /// one statement. `false` when bookings kept it alive.
    async fn delete_if_unbooked(&self, id: Uuid) -> Result<bool>;
    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Plain insert with no overlap guard.
    async fn create(&self, booking: NewBooking) -> Result<Booking>;
    /// Inserts only if no non-cancelled booking on the same turf and date
    /// overlaps; `None` when the slot was taken. Check and insert are one
    /// statement.
    async fn create_if_available(&self, booking: NewBooking) -> Result<Option<Booking>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>>;
    async fn find_overlapping(
        &self,
        turf_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Vec<Booking>>;
    async fn list_active_for_day(&self, turf_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<BookingWithTurf>>;
    async fn list_upcoming_by_user(&self, user_id: Uuid, from: NaiveDate) -> Result<Vec<BookingWithTurf>>;
    async fn list_by_turf(&self, turf_id: Uuid) -> Result<Vec<Booking>>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<BookingWithTurf>>;
    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<BookingWithTurf>>;
    /// Compare-and-set: moves the booking from `from` to `to` only while it
    /// is still in `from`. `Conflict` when another write changed it first.
    async fn update_status(
        &self,
        id: Uuid,
        from: (BookingStatus, PaymentStatus),
        to: (BookingStatus, PaymentStatus),
    ) -> Result<Booking>;
    async fn stats(&self) -> Result<BookingStats>;
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

/// Storage format for slot times: zero-padded so text order is time order.
pub(crate) fn time_to_str(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub(crate) fn date_to_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn unique_violation(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(message.to_string()),
        _ => AppError::Database(err.to_string()),
    }
}
