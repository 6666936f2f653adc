#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use turfbook::{
    auth::AuthContext,
    config::Settings,
    domain::{CreateTurfRequest, NewAccount, NewTurf, Profile, Role, Turf},
    email::MemoryEmailSender,
    repository::{ProfileRepository, SqliteProfileRepository, SqliteTurfRepository, TurfRepository},
    service::{clock::FixedClock, ServiceContext},
};
use uuid::Uuid;

/// In-memory database. One connection that never expires, since every
/// SQLite memory connection is its own database.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

pub fn at(date: &str, time: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_time(chrono::NaiveTime::parse_from_str(time, "%H:%M").unwrap())
}

pub struct TestApp {
    pub pool: SqlitePool,
    pub services: Arc<ServiceContext>,
    pub clock: Arc<FixedClock>,
    pub mailer: Arc<MemoryEmailSender>,
    pub settings: Settings,
}

impl TestApp {
    /// Services over a fresh database with the clock at 2024-05-19 05:00.
    pub async fn new() -> anyhow::Result<Self> {
        Self::at(at("2024-05-19", "05:00")).await
    }

    pub async fn at(now: NaiveDateTime) -> anyhow::Result<Self> {
        let pool = test_pool().await?;
        let settings = Settings::default();
        let clock = Arc::new(FixedClock::new(now));
        let mailer = Arc::new(MemoryEmailSender::new());

        let services = Arc::new(ServiceContext::new(
            pool.clone(),
            &settings,
            mailer.clone(),
            clock.clone(),
        ));

        Ok(Self { pool, services, clock, mailer, settings })
    }

    /// Creates an account directly and returns a context for it.
    pub async fn user(&self, email: &str, role: Role) -> anyhow::Result<AuthContext> {
        let profile = create_account(&self.pool, email, role).await?;
        Ok(AuthContext::new(Uuid::new_v4().to_string(), profile))
    }

    pub async fn turf(&self, owner: &AuthContext) -> anyhow::Result<Turf> {
        Ok(self
            .services
            .turf_service
            .add_turf(owner, turf_request("Green Field"))
            .await?)
    }
}

pub async fn create_account(pool: &SqlitePool, email: &str, role: Role) -> anyhow::Result<Profile> {
    let repo = SqliteProfileRepository::new(pool.clone());
    Ok(repo
        .create_account(NewAccount {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: None,
            role,
        })
        .await?)
}

pub async fn create_turf(pool: &SqlitePool, owner_id: Uuid, name: &str, sport: &str) -> anyhow::Result<Turf> {
    let repo = SqliteTurfRepository::new(pool.clone());
    let mut request = turf_request(name);
    request.sport = sport.to_string();
    Ok(repo.create(NewTurf::from_request(owner_id, request)).await?)
}

pub fn turf_request(name: &str) -> CreateTurfRequest {
    CreateTurfRequest {
        name: name.to_string(),
        location: "Koramangala, Bengaluru".to_string(),
        sport: "Football".to_string(),
        description: Some("5-a-side football".to_string()),
        image: None,
        price: 1200.0,
        price_per_hour: 1200.0,
        capacity: 10,
        amenities: vec!["Floodlights".to_string(), "Parking".to_string()],
        rating: None,
        owner_id: None,
    }
}
