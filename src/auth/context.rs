use uuid::Uuid;

use crate::domain::{Profile, Role};

/// The caller's identity for one request.
///
/// Built from the session cookie by the auth middleware and handed to every
/// service call that acts on behalf of a user. It is rebuilt on each request,
/// so role changes are picked up on the next call; `AuthService::sign_out`
/// consumes it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub session_id: String,
    pub profile: Profile,
}

impl AuthContext {
    pub fn new(session_id: impl Into<String>, profile: Profile) -> Self {
        Self {
            user_id: profile.id,
            session_id: session_id.into(),
            profile,
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn is_admin(&self) -> bool {
        self.profile.role == Role::Admin
    }
}
