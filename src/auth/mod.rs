use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    domain::{
        NewAccount, PasswordResetConfirm, PasswordResetRequest, Profile, Role, SignInRequest,
        SignUpRequest,
    },
    email::{EmailSender, OutgoingEmail},
    error::{AppError, Result},
    repository::ProfileRepository,
    service::profile_events::ProfileEventHub,
};

pub mod context;
pub mod password_reset;
pub mod session;

pub use context::AuthContext;
use password_reset::ResetTokenStore;
use session::{Session, SessionStore};

pub const SESSION_COOKIE: &str = "session";

pub struct AuthService {
    session_store: SessionStore,
    reset_tokens: ResetTokenStore,
    profiles: Arc<dyn ProfileRepository>,
    mailer: Arc<dyn EmailSender>,
    events: Arc<ProfileEventHub>,
    config: AuthConfig,
    base_url: String,
}

impl AuthService {
    pub fn new(
        pool: SqlitePool,
        profiles: Arc<dyn ProfileRepository>,
        mailer: Arc<dyn EmailSender>,
        events: Arc<ProfileEventHub>,
        config: AuthConfig,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            session_store: SessionStore::new(pool.clone()),
            reset_tokens: ResetTokenStore::new(pool),
            profiles,
            mailer,
            events,
            config,
            base_url: base_url.into(),
        }
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Self-service registration. Admin is never self-assigned.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<Profile> {
        request.validate()?;

        let role = request.role.unwrap_or(Role::Customer);
        if role == Role::Admin {
            return Err(AppError::BadRequest("Role must be customer or turf_owner".to_string()));
        }

        let profile = self.register(request, role).await?;
        tracing::info!("New {} account {}", profile.role, profile.id);
        Ok(profile)
    }

    /// Admin-only: registers an account with the turf_owner role.
    pub async fn create_turf_owner(&self, ctx: &AuthContext, request: SignUpRequest) -> Result<Profile> {
        if !ctx.is_admin() {
            return Err(AppError::Forbidden("Only admins can create turf owners".to_string()));
        }
        request.validate()?;

        let profile = self.register(request, Role::TurfOwner).await?;
        tracing::info!("Admin {} created turf owner {}", ctx.user_id, profile.id);
        Ok(profile)
    }

    async fn register(&self, request: SignUpRequest, role: Role) -> Result<Profile> {
        let password_hash = Self::hash_password(&request.password).await?;

        self.profiles
            .create_account(NewAccount {
                email: request.email.trim().to_lowercase(),
                password_hash,
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                phone: request.phone.filter(|p| !p.trim().is_empty()),
                role,
            })
            .await
    }

    /// Checks credentials and opens a session. Returns the profile and the
    /// raw session token for the cookie.
    pub async fn sign_in(&self, request: SignInRequest) -> Result<(Profile, String)> {
        request.validate()?;
        let email = request.email.trim().to_lowercase();

        let Some((user_id, password_hash)) = self.profiles.find_credentials(&email).await? else {
            tracing::debug!("Sign-in for unknown email");
            return Err(AppError::Unauthorized);
        };

        if !Self::verify_password(&request.password, &password_hash).await? {
            tracing::debug!("Sign-in with wrong password for {}", user_id);
            return Err(AppError::Unauthorized);
        }

        let profile = self
            .profiles
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let (_, token) = self.create_session(user_id).await?;
        tracing::info!("User {} signed in", user_id);

        Ok((profile, token))
    }

    pub async fn create_session(&self, user_id: Uuid) -> Result<(Session, String)> {
        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(self.config.session_duration_hours);

        let session = self.session_store
            .create(user_id, &token, expires_at)
            .await?;

        Ok((session, token))
    }

    pub async fn validate_session(&self, token: &str) -> Result<Option<Session>> {
        self.session_store.find_by_token(token).await
    }

    /// Builds the request's `AuthContext` from a session token. `None` when
    /// the session is unknown, expired, or its profile is gone.
    pub async fn load_context(&self, token: &str) -> Result<Option<AuthContext>> {
        let Some(session) = self.validate_session(token).await? else {
            return Ok(None);
        };

        let profile = self.profiles.find_by_id(session.user_id).await?;
        Ok(profile.map(|profile| AuthContext::new(session.id, profile)))
    }

    /// Ends the caller's session and closes their profile subscriptions.
    pub async fn sign_out(&self, ctx: AuthContext) -> Result<()> {
        self.session_store.delete_by_id(&ctx.session_id).await?;
        self.events.close_user(ctx.user_id).await;
        tracing::info!("User {} signed out", ctx.user_id);
        Ok(())
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.session_store.cleanup_expired().await
    }

    /// Emails a reset link when the account exists. Always succeeds so the
    /// response does not reveal which emails are registered.
    pub async fn request_password_reset(&self, request: PasswordResetRequest) -> Result<()> {
        request.validate()?;
        let email = request.email.trim().to_lowercase();

        let Some(profile) = self.profiles.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_token();
        let expires_at = Utc::now() + Duration::minutes(self.config.password_reset_ttl_minutes);
        self.reset_tokens.create(profile.id, &token, expires_at).await?;

        let link = format!("{}/reset-password?token={}", self.base_url.trim_end_matches('/'), token);
        let email = OutgoingEmail {
            to: profile.email.clone(),
            subject: "Reset your Turfbook password".to_string(),
            body: format!(
                "Hi {},\n\nUse the link below to choose a new password. It expires in {} minutes.\n\n{}\n\nIf you did not ask for this, ignore this email.\n",
                profile.first_name, self.config.password_reset_ttl_minutes, link
            ),
        };

        if let Err(e) = self.mailer.send(email).await {
            tracing::warn!("Failed to send password reset email via {}: {}", self.mailer.name(), e);
        }

        Ok(())
    }

    /// Sets a new password from a reset token and signs the user out everywhere.
    pub async fn reset_password(&self, request: PasswordResetConfirm) -> Result<()> {
        request.validate()?;

        let user_id = self
            .reset_tokens
            .consume(&request.token)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

        let password_hash = Self::hash_password(&request.new_password).await?;
        self.profiles.update_password(user_id, &password_hash).await?;

        let revoked = self.session_store.delete_by_user(user_id).await?;
        self.events.close_user(user_id).await;
        tracing::info!("Password reset for {}, {} sessions revoked", user_id, revoked);

        Ok(())
    }

    pub fn create_session_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.config.secure_cookies)
            .max_age(cookie::time::Duration::hours(self.config.session_duration_hours))
            .build()
    }

    pub fn create_logout_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
