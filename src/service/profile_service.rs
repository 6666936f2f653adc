use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;
use crate::{
    auth::AuthContext,
    domain::*,
    error::{AppError, Result},
    repository::ProfileRepository,
};
use super::profile_events::{ProfileEvent, ProfileEventHub};

pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
    events: Arc<ProfileEventHub>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ProfileRepository>, events: Arc<ProfileEventHub>) -> Self {
        Self { repo, events }
    }

    pub async fn me(&self, ctx: &AuthContext) -> Result<Profile> {
        self.repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn update_me(&self, ctx: &AuthContext, update: UpdateProfileRequest) -> Result<Profile> {
        update.validate()?;

        let profile = self.repo.update(ctx.user_id, update).await?;
        self.events.publish(ProfileEvent::Updated { profile: profile.clone() });

        Ok(profile)
    }

    pub async fn list(&self, ctx: &AuthContext, limit: i64, offset: i64) -> Result<Vec<Profile>> {
        require_admin(ctx)?;
        self.repo.list(limit, offset).await
    }

    pub async fn count(&self, ctx: &AuthContext) -> Result<i64> {
        require_admin(ctx)?;
        self.repo.count().await
    }

    /// Admin role change. Admins cannot demote themselves, so at least one
    /// admin always remains reachable.
    pub async fn set_role(&self, ctx: &AuthContext, user_id: Uuid, role: Role) -> Result<Profile> {
        require_admin(ctx)?;

        if user_id == ctx.user_id && role != Role::Admin {
            return Err(AppError::BadRequest("Admins cannot change their own role".to_string()));
        }

        let previous = self
            .repo
            .find_role(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        if previous == role {
            return self.repo
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Profile not found".to_string()));
        }

        let profile = self.repo.set_role(user_id, role).await?;
        tracing::info!("Admin {} changed role of {} from {} to {}", ctx.user_id, user_id, previous, role);
        self.events.publish(ProfileEvent::RoleChanged { profile: profile.clone(), previous });

        Ok(profile)
    }
}

fn require_admin(ctx: &AuthContext) -> Result<()> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}
