use crate::domain::Role;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Render,
    RedirectLogin,
    /// Signed in but not allowed here; send to the role's landing page.
    RedirectHome(Role),
}

impl AccessDecision {
    /// Redirect target, or `None` when the page should render.
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            AccessDecision::Render => None,
            AccessDecision::RedirectLogin => Some(LOGIN_PATH),
            AccessDecision::RedirectHome(role) => Some(role.landing_path()),
        }
    }
}

/// Page access decision.
///
/// `role` is the result of the role lookup; `None` covers both a missing
/// profile and a failed lookup, and is never retried. An empty `allowed`
/// admits any signed-in caller with a known role.
pub fn gate(authenticated: bool, role: Option<Role>, allowed: &[Role]) -> AccessDecision {
    if !authenticated {
        return AccessDecision::RedirectLogin;
    }

    match role {
        None => AccessDecision::RedirectLogin,
        Some(role) if allowed.is_empty() || allowed.contains(&role) => AccessDecision::Render,
        Some(role) => AccessDecision::RedirectHome(role),
    }
}

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const TURF_MANAGERS: &[Role] = &[Role::TurfOwner, Role::Admin];
pub const CUSTOMERS: &[Role] = &[Role::Customer];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_renders_admin_page() {
        assert_eq!(gate(true, Some(Role::Admin), ADMIN_ONLY), AccessDecision::Render);
    }

    #[test]
    fn customer_is_sent_home_from_admin_page() {
        let decision = gate(true, Some(Role::Customer), ADMIN_ONLY);
        assert_eq!(decision, AccessDecision::RedirectHome(Role::Customer));
        assert_eq!(decision.redirect_path(), Some("/customer/home"));
    }

    #[test]
    fn anonymous_goes_to_login_whatever_is_allowed() {
        for allowed in [ADMIN_ONLY, TURF_MANAGERS, CUSTOMERS, &[]] {
            assert_eq!(gate(false, None, allowed), AccessDecision::RedirectLogin);
            assert_eq!(gate(false, Some(Role::Admin), allowed), AccessDecision::RedirectLogin);
        }
    }

    #[test]
    fn unknown_role_goes_to_login() {
        assert_eq!(gate(true, None, &[]), AccessDecision::RedirectLogin);
        assert_eq!(gate(true, None, CUSTOMERS).redirect_path(), Some(LOGIN_PATH));
    }

    #[test]
    fn empty_allowed_admits_any_role() {
        for role in [Role::Customer, Role::TurfOwner, Role::Admin] {
            assert_eq!(gate(true, Some(role), &[]), AccessDecision::Render);
        }
    }

    #[test]
    fn owner_pages_admit_admins() {
        assert_eq!(gate(true, Some(Role::Admin), TURF_MANAGERS), AccessDecision::Render);
        assert_eq!(
            gate(true, Some(Role::Customer), TURF_MANAGERS).redirect_path(),
            Some("/customer/home")
        );
    }
}
