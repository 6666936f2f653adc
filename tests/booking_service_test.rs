mod common;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use common::{at, TestApp};
use turfbook::{
    config::BookingConfig,
    domain::{
        Booking, BookingStats, BookingStatus, BookingWithTurf, CreateBookingRequest, NewBooking,
        PaymentMethod, PaymentStatus, Role,
    },
    error::{AppError, Result},
    repository::{BookingRepository, SqliteBookingRepository},
    service::{booking_service::BookingService, clock::Clock},
};
use uuid::Uuid;

fn request(turf_id: uuid::Uuid, date: &str, time: &str, method: PaymentMethod) -> CreateBookingRequest {
    CreateBookingRequest {
        turf_id: turf_id.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        end_time: None,
        price: 1200.0,
        payment_method: method,
    }
}

fn t(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn card_and_upi_bookings_start_confirmed_and_paid() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    let card = bookings
        .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card))
        .await?;
    assert_eq!(card.status, BookingStatus::Confirmed);
    assert_eq!(card.payment_status, PaymentStatus::Paid);
    assert_eq!(card.user_id, customer.user_id);
    assert_eq!(card.start_time, t("18:00"));
    assert_eq!(card.end_time, t("19:00"));
    assert_eq!(card.total_price, 1200.0);

    let upi = bookings
        .create_booking(&customer, request(turf.id, "2024-06-01", "19:00", PaymentMethod::Upi))
        .await?;
    assert_eq!(upi.status, BookingStatus::Confirmed);
    assert_eq!(upi.payment_status, PaymentStatus::Paid);

    Ok(())
}

#[tokio::test]
async fn pay_at_venue_booking_starts_pending() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;

    let booking = app
        .services
        .booking_service
        .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Venue))
        .await?;

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.payment_status, PaymentStatus::Pending);
    assert_eq!(booking.payment_method, PaymentMethod::Venue);

    Ok(())
}

#[tokio::test]
async fn invalid_payloads_are_validation_errors() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    let mut bad_turf = request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card);
    bad_turf.turf_id = "not-a-uuid".to_string();
    assert!(matches!(bookings.create_booking(&customer, bad_turf).await, Err(AppError::Validation(_))));

    let empty_date = request(turf.id, "", "18:00", PaymentMethod::Card);
    assert!(matches!(bookings.create_booking(&customer, empty_date).await, Err(AppError::Validation(_))));

    let mut free = request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card);
    free.price = 0.0;
    assert!(matches!(bookings.create_booking(&customer, free).await, Err(AppError::Validation(_))));

    let mut backwards = request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card);
    backwards.end_time = Some("17:00".to_string());
    assert!(matches!(bookings.create_booking(&customer, backwards).await, Err(AppError::Validation(_))));

    let past = request(turf.id, "2024-05-18", "18:00", PaymentMethod::Card);
    assert!(matches!(bookings.create_booking(&customer, past).await, Err(AppError::BadRequest(_))));

    let unknown_turf = request(uuid::Uuid::new_v4(), "2024-06-01", "18:00", PaymentMethod::Card);
    assert!(matches!(bookings.create_booking(&customer, unknown_turf).await, Err(AppError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn overlapping_booking_is_a_conflict() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let first = app.user("first@example.com", Role::Customer).await?;
    let second = app.user("second@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    let mut long = request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card);
    long.end_time = Some("20:00".to_string());
    bookings.create_booking(&first, long).await?;

    let clash = request(turf.id, "2024-06-01", "19:00", PaymentMethod::Upi);
    assert!(matches!(bookings.create_booking(&second, clash).await, Err(AppError::Conflict(_))));

    // Touching the end of the existing booking is fine
    bookings
        .create_booking(&second, request(turf.id, "2024-06-01", "20:00", PaymentMethod::Upi))
        .await?;

    Ok(())
}

#[tokio::test]
async fn separate_check_and_insert_can_double_book() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let a = app.user("a@example.com", Role::Customer).await?;
    let b = app.user("b@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let repo = SqliteBookingRepository::new(app.pool.clone());

    let slot = |user_id| NewBooking {
        user_id,
        turf_id: turf.id,
        booking_date: d("2024-06-01"),
        start_time: t("18:00"),
        end_time: t("19:00"),
        total_price: 1200.0,
        status: BookingStatus::Confirmed,
        payment_status: PaymentStatus::Paid,
        payment_method: PaymentMethod::Card,
    };

    // Both callers check first, then both insert
    let a_free = repo.find_overlapping(turf.id, d("2024-06-01"), t("18:00"), t("19:00")).await?.is_empty();
    let b_free = repo.find_overlapping(turf.id, d("2024-06-01"), t("18:00"), t("19:00")).await?.is_empty();
    assert!(a_free && b_free);

    repo.create(slot(a.user_id)).await?;
    repo.create(slot(b.user_id)).await?;

    let live = repo.list_active_for_day(turf.id, d("2024-06-01")).await?;
    assert_eq!(live.len(), 2);
    assert!(live[0].overlaps(live[1].start_time, live[1].end_time));

    Ok(())
}

#[tokio::test]
async fn conditional_insert_admits_only_one_winner() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let a = app.user("a@example.com", Role::Customer).await?;
    let b = app.user("b@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let repo = SqliteBookingRepository::new(app.pool.clone());

    let slot = |user_id| NewBooking {
        user_id,
        turf_id: turf.id,
        booking_date: d("2024-06-01"),
        start_time: t("18:00"),
        end_time: t("19:00"),
        total_price: 1200.0,
        status: BookingStatus::Confirmed,
        payment_status: PaymentStatus::Paid,
        payment_method: PaymentMethod::Card,
    };

    assert!(repo.create_if_available(slot(a.user_id)).await?.is_some());
    assert!(repo.create_if_available(slot(b.user_id)).await?.is_none());
    assert_eq!(repo.list_active_for_day(turf.id, d("2024-06-01")).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn concurrent_checkouts_book_a_slot_once() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let a = app.user("a@example.com", Role::Customer).await?;
    let b = app.user("b@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    let (first, second) = tokio::join!(
        bookings.create_booking(&a, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card)),
        bookings.create_booking(&b, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Upi)),
    );

    let wins = [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(wins, 1);
    assert!(matches!(first.err().or(second.err()), Some(AppError::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn availability_check_is_repeatable() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    bookings
        .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card))
        .await?;

    let day = d("2024-06-01");
    for _ in 0..3 {
        assert!(!bookings.check_availability(turf.id, day, t("18:30"), t("19:30")).await?);
        assert!(bookings.check_availability(turf.id, day, t("19:00"), t("20:00")).await?);
    }

    Ok(())
}

#[tokio::test]
async fn cancelled_bookings_free_the_slot() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    let booking = bookings
        .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card))
        .await?;
    bookings.cancel_booking(&customer, booking.id).await?;

    assert!(bookings.check_availability(turf.id, d("2024-06-01"), t("18:00"), t("19:00")).await?);

    Ok(())
}

#[tokio::test]
async fn cancel_respects_the_twelve_hour_window() -> anyhow::Result<()> {
    // 37 hours before a 2024-05-20 18:00 booking
    let app = TestApp::at(at("2024-05-19", "05:00")).await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    let early = bookings
        .create_booking(&customer, request(turf.id, "2024-05-20", "18:00", PaymentMethod::Card))
        .await?;
    let late = bookings
        .create_booking(&customer, request(turf.id, "2024-05-20", "20:00", PaymentMethod::Card))
        .await?;

    let cancelled = bookings.cancel_booking(&customer, early.id).await?;
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.payment_status, PaymentStatus::Paid);

    // 11 hours before 18:00, 13 hours before 20:00
    app.clock.set(at("2024-05-20", "07:00"));
    assert_eq!(app.clock.now(), at("2024-05-20", "07:00"));

    let rebook = bookings
        .create_booking(&customer, request(turf.id, "2024-05-20", "18:00", PaymentMethod::Upi))
        .await?;
    assert!(matches!(bookings.cancel_booking(&customer, rebook.id).await, Err(AppError::BadRequest(_))));

    bookings.cancel_booking(&customer, late.id).await?;

    Ok(())
}

#[tokio::test]
async fn cancel_requires_the_booking_owner() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let stranger = app.user("stranger@example.com", Role::Customer).await?;
    let admin = app.user("admin@example.com", Role::Admin).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    let booking = bookings
        .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card))
        .await?;

    assert!(matches!(bookings.cancel_booking(&stranger, booking.id).await, Err(AppError::Forbidden(_))));
    assert!(matches!(bookings.cancel_booking(&admin, booking.id).await, Err(AppError::Forbidden(_))));
    assert!(matches!(
        bookings.cancel_booking(&customer, uuid::Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));

    bookings.cancel_booking(&customer, booking.id).await?;
    assert!(matches!(bookings.cancel_booking(&customer, booking.id).await, Err(AppError::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn turf_owner_settles_pay_at_venue_bookings() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let other_owner = app.user("other@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    let booking = bookings
        .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Venue))
        .await?;

    assert!(matches!(bookings.confirm_payment(&customer, booking.id).await, Err(AppError::Forbidden(_))));
    assert!(matches!(bookings.confirm_payment(&other_owner, booking.id).await, Err(AppError::Forbidden(_))));

    let failed = bookings.fail_payment(&owner, booking.id).await?;
    assert_eq!(failed.status, BookingStatus::Pending);
    assert_eq!(failed.payment_status, PaymentStatus::Failed);

    let settled = bookings.confirm_payment(&owner, booking.id).await?;
    assert_eq!(settled.status, BookingStatus::Confirmed);
    assert_eq!(settled.payment_status, PaymentStatus::Paid);

    assert!(matches!(bookings.confirm_payment(&owner, booking.id).await, Err(AppError::Conflict(_))));
    assert!(matches!(bookings.fail_payment(&owner, booking.id).await, Err(AppError::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn day_slots_mark_taken_and_past_slots() -> anyhow::Result<()> {
    let app = TestApp::at(at("2024-06-01", "09:30")).await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    bookings
        .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card))
        .await?;

    let slots = bookings.day_slots(turf.id, d("2024-06-01")).await;

    // 06:00 to 23:00 in one-hour slots
    assert_eq!(slots.len(), 17);
    assert_eq!(slots[0].start_time, t("06:00"));
    assert_eq!(slots[16].end_time, t("23:00"));

    let slot = |start: &str| slots.iter().find(|s| s.start_time == t(start)).unwrap();
    assert!(!slot("09:00").available);
    assert!(slot("10:00").available);
    assert!(!slot("18:00").available);
    assert!(slot("19:00").available);

    Ok(())
}

#[tokio::test]
async fn day_slots_fail_closed_when_the_store_fails() -> anyhow::Result<()> {
    let app = TestApp::at(at("2024-06-01", "05:00")).await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let turf = app.turf(&owner).await?;

    app.pool.close().await;

    let slots = app.services.booking_service.day_slots(turf.id, d("2024-06-01")).await;
    assert!(!slots.is_empty());
    assert!(slots.iter().all(|s| !s.available));

    Ok(())
}

#[tokio::test]
async fn upcoming_lists_only_future_live_bookings_in_order() -> anyhow::Result<()> {
    let app = TestApp::at(at("2024-05-19", "05:00")).await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    let later = bookings
        .create_booking(&customer, request(turf.id, "2024-06-02", "18:00", PaymentMethod::Card))
        .await?;
    let sooner = bookings
        .create_booking(&customer, request(turf.id, "2024-05-25", "07:00", PaymentMethod::Venue))
        .await?;
    let dropped = bookings
        .create_booking(&customer, request(turf.id, "2024-05-30", "10:00", PaymentMethod::Card))
        .await?;
    bookings.cancel_booking(&customer, dropped.id).await?;

    let upcoming = bookings.upcoming_mine(&customer).await?;
    let ids: Vec<_> = upcoming.iter().map(|b| b.booking.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);
    assert_eq!(upcoming[0].turf.name, turf.name);

    assert_eq!(bookings.list_mine(&customer).await?.len(), 3);

    // A week later the 05-25 booking is history
    app.clock.advance(Duration::days(7));
    let upcoming = bookings.upcoming_mine(&customer).await?;
    assert_eq!(upcoming.len(), 1);

    Ok(())
}

#[tokio::test]
async fn admin_views_require_admin() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let admin = app.user("admin@example.com", Role::Admin).await?;
    let turf = app.turf(&owner).await?;
    let bookings = &app.services.booking_service;

    bookings
        .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card))
        .await?;
    bookings
        .create_booking(&customer, request(turf.id, "2024-06-01", "19:00", PaymentMethod::Venue))
        .await?;

    assert!(matches!(bookings.list_all(&owner, 50, 0).await, Err(AppError::Forbidden(_))));
    assert!(matches!(bookings.stats(&customer).await, Err(AppError::Forbidden(_))));

    assert_eq!(bookings.list_all(&admin, 50, 0).await?.len(), 2);
    let stats = bookings.stats(&admin).await?;
    assert_eq!(stats.total, 2);
    assert_eq!(stats.confirmed, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.paid_revenue, 1200.0);

    assert_eq!(bookings.list_for_turf(&owner, turf.id).await?.len(), 2);
    assert_eq!(bookings.list_for_owner(&owner).await?.len(), 2);
    assert!(matches!(bookings.list_for_turf(&customer, turf.id).await, Err(AppError::Forbidden(_))));

    Ok(())
}

/// Lets a customer cancel a booking, and a rival rebook its slot, right
/// after the service has read the booking and before it writes.
struct CancelAfterRead {
    inner: Arc<dyn BookingRepository>,
    rival: Uuid,
    armed: AtomicBool,
}

#[async_trait]
impl BookingRepository for CancelAfterRead {
    async fn create(&self, booking: NewBooking) -> Result<Booking> {
        self.inner.create(booking).await
    }

    async fn create_if_available(&self, booking: NewBooking) -> Result<Option<Booking>> {
        self.inner.create_if_available(booking).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let found = self.inner.find_by_id(id).await?;

        if let Some(b) = found.as_ref().filter(|_| self.armed.swap(false, Ordering::SeqCst)) {
            self.inner
                .update_status(id, (b.status, b.payment_status), (BookingStatus::Cancelled, b.payment_status))
                .await?;
            self.inner
                .create_if_available(NewBooking {
                    user_id: self.rival,
                    turf_id: b.turf_id,
                    booking_date: b.booking_date,
                    start_time: b.start_time,
                    end_time: b.end_time,
                    total_price: b.total_price,
                    status: BookingStatus::Confirmed,
                    payment_status: PaymentStatus::Paid,
                    payment_method: PaymentMethod::Card,
                })
                .await?
                .expect("freed slot is rebooked");
        }

        Ok(found)
    }

    async fn find_overlapping(
        &self,
        turf_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Vec<Booking>> {
        self.inner.find_overlapping(turf_id, date, start, end).await
    }

    async fn list_active_for_day(&self, turf_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>> {
        self.inner.list_active_for_day(turf_id, date).await
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<BookingWithTurf>> {
        self.inner.list_by_user(user_id).await
    }

    async fn list_upcoming_by_user(&self, user_id: Uuid, from: NaiveDate) -> Result<Vec<BookingWithTurf>> {
        self.inner.list_upcoming_by_user(user_id, from).await
    }

    async fn list_by_turf(&self, turf_id: Uuid) -> Result<Vec<Booking>> {
        self.inner.list_by_turf(turf_id).await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<BookingWithTurf>> {
        self.inner.list_by_owner(owner_id).await
    }

    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<BookingWithTurf>> {
        self.inner.list_all(limit, offset).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: (BookingStatus, PaymentStatus),
        to: (BookingStatus, PaymentStatus),
    ) -> Result<Booking> {
        self.inner.update_status(id, from, to).await
    }

    async fn stats(&self) -> Result<BookingStats> {
        self.inner.stats().await
    }
}

#[tokio::test]
async fn settling_a_booking_cancelled_mid_flight_is_a_conflict() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let rival = app.user("rival@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;

    let booking = app
        .services
        .booking_service
        .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Venue))
        .await?;

    let racing = BookingService::new(
        Arc::new(CancelAfterRead {
            inner: app.services.booking_repo.clone(),
            rival: rival.user_id,
            armed: AtomicBool::new(true),
        }),
        app.services.turf_repo.clone(),
        app.clock.clone(),
        BookingConfig::default(),
    );

    assert!(matches!(racing.confirm_payment(&owner, booking.id).await, Err(AppError::Conflict(_))));

    // The cancellation stands and only the rival holds the slot
    let stored = app.services.booking_repo.find_by_id(booking.id).await?.expect("booking");
    assert_eq!(stored.status, BookingStatus::Cancelled);
    assert_eq!(stored.payment_status, PaymentStatus::Pending);

    let live = app.services.booking_repo.list_active_for_day(turf.id, d("2024-06-01")).await?;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].user_id, rival.user_id);

    Ok(())
}

#[tokio::test]
async fn status_update_from_a_stale_state_is_refused() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;
    let repo = &app.services.booking_repo;

    let booking = app
        .services
        .booking_service
        .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Venue))
        .await?;
    let pending = (BookingStatus::Pending, PaymentStatus::Pending);

    let cancelled = repo
        .update_status(booking.id, pending, (BookingStatus::Cancelled, PaymentStatus::Pending))
        .await?;
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    assert!(matches!(
        repo.update_status(booking.id, pending, (BookingStatus::Confirmed, PaymentStatus::Paid)).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        repo.update_status(Uuid::new_v4(), pending, (BookingStatus::Confirmed, PaymentStatus::Paid)).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(repo.find_by_id(booking.id).await?.expect("booking").status, BookingStatus::Cancelled);

    Ok(())
}

#[tokio::test]
async fn oversized_slot_length_offers_no_slots() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.user("owner@example.com", Role::TurfOwner).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let turf = app.turf(&owner).await?;

    let bookings = BookingService::new(
        app.services.booking_repo.clone(),
        app.services.turf_repo.clone(),
        app.clock.clone(),
        BookingConfig { slot_minutes: 1 << 32, ..BookingConfig::default() },
    );

    assert!(bookings.day_slots(turf.id, d("2024-06-01")).await.is_empty());
    assert!(matches!(
        bookings
            .create_booking(&customer, request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card))
            .await,
        Err(AppError::Internal(_))
    ));

    // An explicit end time does not depend on the slot length
    let mut explicit = request(turf.id, "2024-06-01", "18:00", PaymentMethod::Card);
    explicit.end_time = Some("19:30".to_string());
    assert_eq!(bookings.create_booking(&customer, explicit).await?.end_time, t("19:30"));

    Ok(())
}
