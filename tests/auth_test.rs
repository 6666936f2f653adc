mod common;

use common::TestApp;
use turfbook::{
    domain::{
        PasswordResetConfirm, PasswordResetRequest, Role, SignInRequest, SignUpRequest,
        UpdateProfileRequest,
    },
    error::AppError,
    service::profile_events::ProfileEvent,
};

fn signup(email: &str, role: Option<Role>) -> SignUpRequest {
    SignUpRequest {
        email: email.to_string(),
        password: "Secret123".to_string(),
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        phone: Some("+919876543210".to_string()),
        role,
    }
}

fn signin(email: &str, password: &str) -> SignInRequest {
    SignInRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

/// Pulls the token out of the last reset link sent.
async fn reset_token(app: &TestApp) -> String {
    let sent = app.mailer.sent().await;
    let body = &sent.last().expect("reset email").body;
    let start = body.find("token=").expect("token in link") + "token=".len();
    body[start..start + 64].to_string()
}

#[tokio::test]
async fn sign_up_then_sign_in() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let auth = &app.services.auth_service;

    let profile = auth.sign_up(signup("Asha@Example.com", None)).await?;
    assert_eq!(profile.email, "asha@example.com");
    assert_eq!(profile.role, Role::Customer);
    assert_eq!(profile.full_name(), "Asha Rao");

    let (signed_in, token) = auth.sign_in(signin("asha@example.com", "Secret123")).await?;
    assert_eq!(signed_in.id, profile.id);

    let ctx = auth.load_context(&token).await?.expect("context");
    assert_eq!(ctx.user_id, profile.id);
    assert_eq!(ctx.role(), Role::Customer);

    Ok(())
}

#[tokio::test]
async fn sign_up_rules() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let auth = &app.services.auth_service;

    let owner = auth.sign_up(signup("owner@example.com", Some(Role::TurfOwner))).await?;
    assert_eq!(owner.role, Role::TurfOwner);

    assert!(matches!(
        auth.sign_up(signup("boss@example.com", Some(Role::Admin))).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        auth.sign_up(signup("OWNER@example.com", None)).await,
        Err(AppError::Conflict(_))
    ));

    let mut weak = signup("weak@example.com", None);
    weak.password = "password".to_string();
    assert!(matches!(auth.sign_up(weak).await, Err(AppError::Validation(_))));

    let mut bad_phone = signup("phone@example.com", None);
    bad_phone.phone = Some("12-34".to_string());
    assert!(matches!(auth.sign_up(bad_phone).await, Err(AppError::Validation(_))));

    Ok(())
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let auth = &app.services.auth_service;
    auth.sign_up(signup("asha@example.com", None)).await?;

    assert!(matches!(
        auth.sign_in(signin("asha@example.com", "Secret124")).await,
        Err(AppError::Unauthorized)
    ));
    assert!(matches!(
        auth.sign_in(signin("nobody@example.com", "Secret123")).await,
        Err(AppError::Unauthorized)
    ));

    Ok(())
}

#[tokio::test]
async fn sign_out_ends_session_and_subscriptions() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let auth = &app.services.auth_service;
    auth.sign_up(signup("asha@example.com", None)).await?;

    let (_, token) = auth.sign_in(signin("asha@example.com", "Secret123")).await?;
    let ctx = auth.load_context(&token).await?.expect("context");
    let mut subscription = app.services.profile_events.subscribe(ctx.user_id).await;

    auth.sign_out(ctx).await?;

    assert!(auth.load_context(&token).await?.is_none());
    assert!(subscription.recv().await.is_none());
    assert!(subscription.is_cancelled());

    Ok(())
}

#[tokio::test]
async fn password_reset_flow() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let auth = &app.services.auth_service;
    auth.sign_up(signup("asha@example.com", None)).await?;
    let (_, old_session) = auth.sign_in(signin("asha@example.com", "Secret123")).await?;

    auth.request_password_reset(PasswordResetRequest { email: "asha@example.com".to_string() }).await?;

    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "asha@example.com");
    assert!(sent[0].body.contains("http://localhost:8080/reset-password?token="));

    let token = reset_token(&app).await;
    auth.reset_password(PasswordResetConfirm {
        token: token.clone(),
        new_password: "Changed456".to_string(),
    })
    .await?;

    // Old sessions are revoked and the old password no longer works
    assert!(auth.load_context(&old_session).await?.is_none());
    assert!(matches!(
        auth.sign_in(signin("asha@example.com", "Secret123")).await,
        Err(AppError::Unauthorized)
    ));
    auth.sign_in(signin("asha@example.com", "Changed456")).await?;

    // Tokens are single use
    assert!(matches!(
        auth.reset_password(PasswordResetConfirm { token, new_password: "Another789".to_string() }).await,
        Err(AppError::BadRequest(_))
    ));

    Ok(())
}

#[tokio::test]
async fn password_reset_for_unknown_email_is_silent() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    app.services
        .auth_service
        .request_password_reset(PasswordResetRequest { email: "ghost@example.com".to_string() })
        .await?;

    assert!(app.mailer.sent().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn only_admins_create_turf_owners() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let admin = app.user("admin@example.com", Role::Admin).await?;
    let customer = app.user("player@example.com", Role::Customer).await?;
    let auth = &app.services.auth_service;

    assert!(matches!(
        auth.create_turf_owner(&customer, signup("owner@example.com", None)).await,
        Err(AppError::Forbidden(_))
    ));

    let owner = auth.create_turf_owner(&admin, signup("owner@example.com", Some(Role::Customer))).await?;
    assert_eq!(owner.role, Role::TurfOwner);

    Ok(())
}

#[tokio::test]
async fn role_changes_reach_the_next_request_and_subscribers() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let admin = app.user("admin@example.com", Role::Admin).await?;
    let auth = &app.services.auth_service;
    let profiles = &app.services.profile_service;

    auth.sign_up(signup("asha@example.com", None)).await?;
    let (profile, token) = auth.sign_in(signin("asha@example.com", "Secret123")).await?;
    let mut subscription = app.services.profile_events.subscribe(profile.id).await;

    let customer = auth_ctx(&app, &token).await?;
    assert!(matches!(
        profiles.set_role(&customer, profile.id, Role::Admin).await,
        Err(AppError::Forbidden(_))
    ));

    profiles.set_role(&admin, profile.id, Role::TurfOwner).await?;

    match subscription.recv().await {
        Some(ProfileEvent::RoleChanged { profile: changed, previous }) => {
            assert_eq!(previous, Role::Customer);
            assert_eq!(changed.role, Role::TurfOwner);
        }
        other => panic!("expected role change, got {:?}", other),
    }

    let refreshed = auth_ctx(&app, &token).await?;
    assert_eq!(refreshed.role(), Role::TurfOwner);

    let updated = profiles
        .update_me(&refreshed, UpdateProfileRequest { first_name: Some("Asha K".to_string()), ..Default::default() })
        .await?;
    assert_eq!(updated.first_name, "Asha K");
    assert!(matches!(subscription.recv().await, Some(ProfileEvent::Updated { .. })));

    assert!(matches!(
        profiles.set_role(&admin, admin.user_id, Role::Customer).await,
        Err(AppError::BadRequest(_))
    ));

    Ok(())
}

async fn auth_ctx(app: &TestApp, token: &str) -> anyhow::Result<turfbook::auth::AuthContext> {
    app.services
        .auth_service
        .load_context(token)
        .await?
        .ok_or_else(|| anyhow::anyhow!("session not found"))
}
