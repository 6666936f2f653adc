use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{NewTurf, Turf, TurfFilter, UpdateTurfRequest},
    error::{AppError, Result},
    repository::{parse_uuid, TurfRepository},
};

#[derive(FromRow)]
struct TurfRow {
    id: String,
    owner_id: String,
    name: String,
    location: String,
    sport: String,
    description: Option<String>,
    image: Option<String>,
    price: f64,
    price_per_hour: f64,
    capacity: i64,
    amenities: String,
    rating: f64,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const TURF_COLUMNS: &str = r#"
    SELECT id, owner_id, name, location, sport, description, image,
           price, price_per_hour, capacity, amenities, rating, is_active,
           created_at, updated_at
    FROM turfs
"#;

pub struct SqliteTurfRepository {
    pool: SqlitePool,
}

impl SqliteTurfRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_turf(row: TurfRow) -> Result<Turf> {
        let amenities: Vec<String> = serde_json::from_str(&row.amenities)
            .map_err(|e| AppError::Database(format!("Invalid amenities: {}", e)))?;

        Ok(Turf {
            id: parse_uuid(&row.id)?,
            owner_id: parse_uuid(&row.owner_id)?,
            name: row.name,
            location: row.location,
            sport: row.sport,
            description: row.description,
            image: row.image,
            price: row.price,
            price_per_hour: row.price_per_hour,
            capacity: row.capacity,
            amenities,
            rating: row.rating,
            is_active: row.is_active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn amenities_to_json(amenities: &[String]) -> Result<String> {
        serde_json::to_string(amenities).map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[async_trait]
impl TurfRepository for SqliteTurfRepository {
    async fn create(&self, turf: NewTurf) -> Result<Turf> {
        let id = Uuid::new_v4();
        let amenities = Self::amenities_to_json(&turf.amenities)?;
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO turfs (
                id, owner_id, name, location, sport, description, image,
                price, price_per_hour, capacity, amenities, rating, is_active,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(turf.owner_id.to_string())
        .bind(&turf.name)
        .bind(&turf.location)
        .bind(&turf.sport)
        .bind(&turf.description)
        .bind(&turf.image)
        .bind(turf.price)
        .bind(turf.price_per_hour)
        .bind(turf.capacity)
        .bind(&amenities)
        .bind(turf.rating)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created turf".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Turf>> {
        let row = sqlx::query_as::<_, TurfRow>(&format!("{} WHERE id = ?", TURF_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_turf).transpose()
    }

    async fn list_active(&self, filter: &TurfFilter) -> Result<Vec<Turf>> {
        let sport = filter.sport.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let location = filter
            .location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let rows = sqlx::query_as::<_, TurfRow>(&format!(
            r#"{}
            WHERE is_active = 1
              AND (? IS NULL OR LOWER(sport) = LOWER(?))
              AND (? IS NULL OR location LIKE ?)
            ORDER BY created_at DESC
            "#,
            TURF_COLUMNS
        ))
        .bind(sport)
        .bind(sport)
        .bind(&location)
        .bind(&location)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_turf)
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Turf>> {
        let rows = sqlx::query_as::<_, TurfRow>(&format!("{} ORDER BY created_at DESC", TURF_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(Self::row_to_turf)
            .collect()
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Turf>> {
        let rows = sqlx::query_as::<_, TurfRow>(&format!(
            "{} WHERE owner_id = ? ORDER BY created_at DESC",
            TURF_COLUMNS
        ))
        .bind(owner_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_turf)
            .collect()
    }

    async fn update(&self, id: Uuid, update: UpdateTurfRequest) -> Result<Turf> {
        let amenities = update
            .amenities
            .as_deref()
            .map(Self::amenities_to_json)
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE turfs
            SET name = COALESCE(?, name),
                location = COALESCE(?, location),
                sport = COALESCE(?, sport),
                description = COALESCE(?, description),
                image = COALESCE(?, image),
                price = COALESCE(?, price),
                price_per_hour = COALESCE(?, price_per_hour),
                capacity = COALESCE(?, capacity),
                amenities = COALESCE(?, amenities),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&update.name)
        .bind(&update.location)
        .bind(&update.sport)
        .bind(&update.description)
        .bind(&update.image)
        .bind(update.price)
        .bind(update.price_per_hour)
        .bind(update.capacity)
        .bind(&amenities)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Turf not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated turf".to_string())
        })
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Turf> {
        let result = sqlx::query("UPDATE turfs SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(if active { 1i32 } else { 0i32 })
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Turf not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated turf".to_string())
        })
    }

    async fn delete_if_unbooked(&self, id: Uuid) -> Result<bool> {
        // Bookings cascade with the turf, so the guard must sit in the
        // DELETE itself
        let result = sqlx::query(
            r#"
            DELETE FROM turfs
            WHERE id = ?
              AND NOT EXISTS (
                  SELECT 1 FROM bookings
                  WHERE turf_id = ? AND status != 'cancelled'
              )
            "#
        )
        .bind(id.to_string())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM turfs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
