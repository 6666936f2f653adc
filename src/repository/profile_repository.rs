use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{NewAccount, Profile, Role, UpdateProfileRequest},
    error::{AppError, Result},
    repository::{parse_uuid, unique_violation, ProfileRepository},
};

#[derive(FromRow)]
struct ProfileRow {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    role: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const PROFILE_COLUMNS: &str = r#"
    SELECT p.id, u.email, p.first_name, p.last_name, p.phone, p.role,
           p.created_at, p.updated_at
    FROM profiles p
    INNER JOIN users u ON u.id = p.id
"#;

pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: ProfileRow) -> Result<Profile> {
        Ok(Profile {
            id: parse_uuid(&row.id)?,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            role: Self::parse_role(&row.role)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_role(s: &str) -> Result<Role> {
        s.parse::<Role>().map_err(AppError::Database)
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepository {
    async fn create_account(&self, account: NewAccount) -> Result<Profile> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, "Email already registered"))?;

        sqlx::query(
            r#"
            INSERT INTO profiles (id, first_name, last_name, phone, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.phone)
        .bind(account.role.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created profile".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!("{} WHERE p.id = ?", PROFILE_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_profile).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!("{} WHERE u.email = ?", PROFILE_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_profile).transpose()
    }

    async fn find_role(&self, id: Uuid) -> Result<Option<Role>> {
        let role = sqlx::query_scalar::<_, String>("SELECT role FROM profiles WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        role.as_deref().map(Self::parse_role).transpose()
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<(Uuid, String)>> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT id, password_hash FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((id, hash)) => Ok(Some((parse_uuid(&id)?, hash))),
            None => Ok(None),
        }
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "{} ORDER BY p.created_at DESC LIMIT ? OFFSET ?",
            PROFILE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_profile)
            .collect()
    }

    async fn update(&self, id: Uuid, update: UpdateProfileRequest) -> Result<Profile> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                phone = COALESCE(?, phone),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Profile not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated profile".to_string())
        })
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<Profile> {
        let result = sqlx::query("UPDATE profiles SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Profile not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated profile".to_string())
        })
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
