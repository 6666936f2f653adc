pub mod access;
pub mod booking_service;
pub mod clock;
pub mod profile_events;
pub mod profile_service;
pub mod turf_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::auth::AuthService;
use crate::config::Settings;
use crate::email::EmailSender;
use crate::repository::*;
use booking_service::BookingService;
use clock::Clock;
use profile_events::ProfileEventHub;
use profile_service::ProfileService;
use turf_service::TurfService;

pub struct ServiceContext {
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub turf_repo: Arc<dyn TurfRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub auth_service: Arc<AuthService>,
    pub turf_service: Arc<TurfService>,
    pub booking_service: Arc<BookingService>,
    pub profile_service: Arc<ProfileService>,
    pub profile_events: Arc<ProfileEventHub>,
    pub clock: Arc<dyn Clock>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        db_pool: SqlitePool,
        settings: &Settings,
        mailer: Arc<dyn EmailSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let profile_repo: Arc<dyn ProfileRepository> = Arc::new(SqliteProfileRepository::new(db_pool.clone()));
        let turf_repo: Arc<dyn TurfRepository> = Arc::new(SqliteTurfRepository::new(db_pool.clone()));
        let booking_repo: Arc<dyn BookingRepository> = Arc::new(SqliteBookingRepository::new(db_pool.clone()));

        let profile_events = Arc::new(ProfileEventHub::new());

        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            profile_repo.clone(),
            mailer,
            profile_events.clone(),
            settings.auth.clone(),
            settings.server.base_url.clone(),
        ));
        let turf_service = Arc::new(TurfService::new(turf_repo.clone(), profile_repo.clone()));
        let booking_service = Arc::new(BookingService::new(
            booking_repo.clone(),
            turf_repo.clone(),
            clock.clone(),
            settings.booking.clone(),
        ));
        let profile_service = Arc::new(ProfileService::new(profile_repo.clone(), profile_events.clone()));

        Self {
            profile_repo,
            turf_repo,
            booking_repo,
            auth_service,
            turf_service,
            booking_service,
            profile_service,
            profile_events,
            clock,
            db_pool,
        }
    }
}
