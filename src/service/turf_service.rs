use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;
use crate::{
    auth::AuthContext,
    domain::*,
    error::{AppError, Result},
    repository::{ProfileRepository, TurfRepository},
};

pub struct TurfService {
    turfs: Arc<dyn TurfRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl TurfService {
    pub fn new(turfs: Arc<dyn TurfRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { turfs, profiles }
    }

    pub async fn list_active(&self, filter: &TurfFilter) -> Result<Vec<Turf>> {
        self.turfs.list_active(filter).await
    }

    /// Inactive turfs read as absent.
    pub async fn get_active(&self, id: Uuid) -> Result<Option<Turf>> {
        Ok(self.turfs.find_by_id(id).await?.filter(|t| t.is_active))
    }

    pub async fn add_turf(&self, ctx: &AuthContext, request: CreateTurfRequest) -> Result<Turf> {
        if !ctx.role().can_manage_turfs() {
            return Err(AppError::Forbidden("Only turf owners can list turfs".to_string()));
        }
        request.validate()?;

        let owner_id = match request.owner_id {
            Some(owner_id) if ctx.is_admin() && owner_id != ctx.user_id => {
                let role = self
                    .profiles
                    .find_role(owner_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Owner not found".to_string()))?;
                if !role.can_manage_turfs() {
                    return Err(AppError::BadRequest("Owner must be a turf owner".to_string()));
                }
                owner_id
            }
            _ => ctx.user_id,
        };

        let turf = self.turfs.create(NewTurf::from_request(owner_id, request)).await?;
        tracing::info!("Turf {} '{}' listed for owner {}", turf.id, turf.name, owner_id);
        Ok(turf)
    }

    pub async fn update_turf(&self, ctx: &AuthContext, id: Uuid, update: UpdateTurfRequest) -> Result<Turf> {
        update.validate()?;
        self.managed_turf(ctx, id).await?;

        let turf = self.turfs.update(id, update).await?;
        tracing::info!("Turf {} updated by {}", id, ctx.user_id);
        Ok(turf)
    }

    pub async fn set_active(&self, ctx: &AuthContext, id: Uuid, active: bool) -> Result<Turf> {
        let turf = self.managed_turf(ctx, id).await?;
        if turf.is_active == active {
            return Ok(turf);
        }

        let turf = self.turfs.set_active(id, active).await?;
        tracing::info!(
            "Turf {} {} by {}",
            id,
            if active { "reactivated" } else { "deactivated" },
            ctx.user_id
        );
        Ok(turf)
    }

    /// Hard delete; refused while live bookings still reference the turf.
    pub async fn delete_turf(&self, ctx: &AuthContext, id: Uuid) -> Result<()> {
        self.managed_turf(ctx, id).await?;

        if !self.turfs.delete_if_unbooked(id).await? {
            return Err(AppError::Conflict(
                "Turf has active bookings; deactivate it instead".to_string(),
            ));
        }

        tracing::info!("Turf {} deleted by {}", id, ctx.user_id);
        Ok(())
    }

    pub async fn list_by_owner(&self, ctx: &AuthContext) -> Result<Vec<Turf>> {
        if !ctx.role().can_manage_turfs() {
            return Err(AppError::Forbidden("Only turf owners have listings".to_string()));
        }
        self.turfs.list_by_owner(ctx.user_id).await
    }

    pub async fn list_all(&self, ctx: &AuthContext) -> Result<Vec<Turf>> {
        if !ctx.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        self.turfs.list_all().await
    }

    /// Loads a turf the caller may manage: its owner or any admin.
    pub(crate) async fn managed_turf(&self, ctx: &AuthContext, id: Uuid) -> Result<Turf> {
        let turf = self
            .turfs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Turf not found".to_string()))?;

        if turf.owner_id != ctx.user_id && !ctx.is_admin() {
            return Err(AppError::Forbidden("You do not manage this turf".to_string()));
        }

        Ok(turf)
    }
}
