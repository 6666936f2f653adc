use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        parse_booking_date, parse_slot_time, Booking, BookingStats, BookingStatus, BookingWithTurf,
        NewBooking, PaymentMethod, PaymentStatus, TurfSummary,
    },
    error::{AppError, Result},
    repository::{date_to_str, parse_uuid, time_to_str, BookingRepository},
};

#[derive(FromRow)]
struct BookingRow {
    id: String,
    user_id: String,
    turf_id: String,
    booking_date: String,
    start_time: String,
    end_time: String,
    total_price: f64,
    status: String,
    payment_status: String,
    payment_method: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct BookingWithTurfRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    turf_name: String,
    turf_location: String,
    turf_sport: String,
    turf_image: Option<String>,
}

const BOOKING_COLUMNS: &str = r#"
    SELECT id, user_id, turf_id, booking_date, start_time, end_time, total_price,
           status, payment_status, payment_method, created_at, updated_at
    FROM bookings
"#;

const BOOKING_WITH_TURF_COLUMNS: &str = r#"
    SELECT b.id, b.user_id, b.turf_id, b.booking_date, b.start_time, b.end_time,
           b.total_price, b.status, b.payment_status, b.payment_method,
           b.created_at, b.updated_at,
           t.name AS turf_name, t.location AS turf_location,
           t.sport AS turf_sport, t.image AS turf_image
    FROM bookings b
    INNER JOIN turfs t ON t.id = b.turf_id
"#;

pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

impl SqliteBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_booking(row: BookingRow) -> Result<Booking> {
        Ok(Booking {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            turf_id: parse_uuid(&row.turf_id)?,
            booking_date: parse_booking_date(&row.booking_date)
                .ok_or_else(|| AppError::Database(format!("Invalid booking date: {}", row.booking_date)))?,
            start_time: Self::parse_time(&row.start_time)?,
            end_time: Self::parse_time(&row.end_time)?,
            total_price: row.total_price,
            status: Self::parse_status(&row.status)?,
            payment_status: Self::parse_payment_status(&row.payment_status)?,
            payment_method: Self::parse_payment_method(&row.payment_method)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_booking_with_turf(row: BookingWithTurfRow) -> Result<BookingWithTurf> {
        let booking = Self::row_to_booking(row.booking)?;
        let turf = TurfSummary {
            id: booking.turf_id,
            name: row.turf_name,
            location: row.turf_location,
            sport: row.turf_sport,
            image: row.turf_image,
        };
        Ok(BookingWithTurf { booking, turf })
    }

    fn parse_time(s: &str) -> Result<NaiveTime> {
        parse_slot_time(s).ok_or_else(|| AppError::Database(format!("Invalid slot time: {}", s)))
    }

    fn parse_status(s: &str) -> Result<BookingStatus> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(AppError::Database(format!("Invalid booking status: {}", s))),
        }
    }

    fn status_to_str(status: &BookingStatus) -> &'static str {
        match status {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    fn parse_payment_status(s: &str) -> Result<PaymentStatus> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(AppError::Database(format!("Invalid payment status: {}", s))),
        }
    }

    fn payment_status_to_str(status: &PaymentStatus) -> &'static str {
        match status {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    fn parse_payment_method(s: &str) -> Result<PaymentMethod> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "venue" => Ok(PaymentMethod::Venue),
            _ => Err(AppError::Database(format!("Invalid payment method: {}", s))),
        }
    }

    fn payment_method_to_str(method: &PaymentMethod) -> &'static str {
        match method {
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Venue => "venue",
        }
    }

    async fn fetch_created(&self, id: Uuid) -> Result<Booking> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created booking".to_string())
        })
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn create(&self, booking: NewBooking) -> Result<Booking> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, user_id, turf_id, booking_date, start_time, end_time, total_price,
                status, payment_status, payment_method, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(booking.user_id.to_string())
        .bind(booking.turf_id.to_string())
        .bind(date_to_str(booking.booking_date))
        .bind(time_to_str(booking.start_time))
        .bind(time_to_str(booking.end_time))
        .bind(booking.total_price)
        .bind(Self::status_to_str(&booking.status))
        .bind(Self::payment_status_to_str(&booking.payment_status))
        .bind(Self::payment_method_to_str(&booking.payment_method))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.fetch_created(id).await
    }

    async fn create_if_available(&self, booking: NewBooking) -> Result<Option<Booking>> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let turf_id = booking.turf_id.to_string();
        let date = date_to_str(booking.booking_date);
        let start = time_to_str(booking.start_time);
        let end = time_to_str(booking.end_time);

        // A single INSERT ... SELECT is atomic in SQLite, so no other writer
        // can slip an overlapping row in between the check and the insert.
        let result = sqlx::query(
            r#"
            INSERT INTO bookings (
                id, user_id, turf_id, booking_date, start_time, end_time, total_price,
                status, payment_status, payment_method, created_at, updated_at
            )
            SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM bookings
                WHERE turf_id = ?
                  AND booking_date = ?
                  AND status != 'cancelled'
                  AND start_time < ?
                  AND end_time > ?
            )
            "#
        )
        .bind(id.to_string())
        .bind(booking.user_id.to_string())
        .bind(&turf_id)
        .bind(&date)
        .bind(&start)
        .bind(&end)
        .bind(booking.total_price)
        .bind(Self::status_to_str(&booking.status))
        .bind(Self::payment_status_to_str(&booking.payment_status))
        .bind(Self::payment_method_to_str(&booking.payment_method))
        .bind(now)
        .bind(now)
        .bind(&turf_id)
        .bind(&date)
        .bind(&end)
        .bind(&start)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch_created(id).await.map(Some)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("{} WHERE id = ?", BOOKING_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_booking).transpose()
    }

    async fn find_overlapping(
        &self,
        turf_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"{}
            WHERE turf_id = ?
              AND booking_date = ?
              AND status != 'cancelled'
              AND start_time < ?
              AND end_time > ?
            ORDER BY start_time ASC
            "#,
            BOOKING_COLUMNS
        ))
        .bind(turf_id.to_string())
        .bind(date_to_str(date))
        .bind(time_to_str(end))
        .bind(time_to_str(start))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_booking)
            .collect()
    }

    async fn list_active_for_day(&self, turf_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"{}
            WHERE turf_id = ? AND booking_date = ? AND status != 'cancelled'
            ORDER BY start_time ASC
            "#,
            BOOKING_COLUMNS
        ))
        .bind(turf_id.to_string())
        .bind(date_to_str(date))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_booking)
            .collect()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<BookingWithTurf>> {
        let rows = sqlx::query_as::<_, BookingWithTurfRow>(&format!(
            "{} WHERE b.user_id = ? ORDER BY b.booking_date DESC, b.start_time DESC",
            BOOKING_WITH_TURF_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_booking_with_turf)
            .collect()
    }

    async fn list_upcoming_by_user(&self, user_id: Uuid, from: NaiveDate) -> Result<Vec<BookingWithTurf>> {
        let rows = sqlx::query_as::<_, BookingWithTurfRow>(&format!(
            r#"{}
            WHERE b.user_id = ?
              AND b.booking_date >= ?
              AND b.status IN ('pending', 'confirmed')
            ORDER BY b.booking_date ASC, b.start_time ASC
            "#,
            BOOKING_WITH_TURF_COLUMNS
        ))
        .bind(user_id.to_string())
        .bind(date_to_str(from))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_booking_with_turf)
            .collect()
    }

    async fn list_by_turf(&self, turf_id: Uuid) -> Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "{} WHERE turf_id = ? ORDER BY booking_date DESC, start_time DESC",
            BOOKING_COLUMNS
        ))
        .bind(turf_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_booking)
            .collect()
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<BookingWithTurf>> {
        let rows = sqlx::query_as::<_, BookingWithTurfRow>(&format!(
            "{} WHERE t.owner_id = ? ORDER BY b.booking_date DESC, b.start_time DESC",
            BOOKING_WITH_TURF_COLUMNS
        ))
        .bind(owner_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_booking_with_turf)
            .collect()
    }

    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<BookingWithTurf>> {
        let rows = sqlx::query_as::<_, BookingWithTurfRow>(&format!(
            "{} ORDER BY b.created_at DESC LIMIT ? OFFSET ?",
            BOOKING_WITH_TURF_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_booking_with_turf)
            .collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: (BookingStatus, PaymentStatus),
        to: (BookingStatus, PaymentStatus),
    ) -> Result<Booking> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = ?, payment_status = ?, updated_at = ?
            WHERE id = ? AND status = ? AND payment_status = ?
            "#
        )
        .bind(Self::status_to_str(&to.0))
        .bind(Self::payment_status_to_str(&to.1))
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .bind(Self::status_to_str(&from.0))
        .bind(Self::payment_status_to_str(&from.1))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                Some(current) => {
                    tracing::info!(
                        "Booking {} moved to {:?}/{:?} before the update from {:?}/{:?}",
                        id, current.status, current.payment_status, from.0, from.1
                    );
                    Err(AppError::Conflict("Booking was changed by another request".to_string()))
                }
                None => Err(AppError::NotFound("Booking not found".to_string())),
            };
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated booking".to_string())
        })
    }

    async fn stats(&self) -> Result<BookingStats> {
        let row: (i64, i64, i64, i64, f64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'confirmed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0),
                CAST(COALESCE(SUM(
                    CASE WHEN payment_status = 'paid' AND status != 'cancelled'
                         THEN total_price ELSE 0.0 END
                ), 0.0) AS REAL)
            FROM bookings
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(BookingStats {
            total: row.0,
            pending: row.1,
            confirmed: row.2,
            cancelled: row.3,
            paid_revenue: row.4,
        })
    }
}
