pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put, patch},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Pages, guarded by the role gate (redirects)
        .route("/login", get(handlers::pages::login_page))
        .route("/dashboard", get(handlers::pages::dashboard))
        .route("/admin/dashboard", get(handlers::pages::admin_dashboard))
        .route("/owner/dashboard", get(handlers::pages::owner_dashboard))
        .route("/customer/home", get(handlers::pages::customer_home))

        // Auth routes
        .nest("/auth", auth_routes(app_state.clone()))

        // API routes
        .nest("/api", api_routes(app_state.clone()))

        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/password-reset", post(handlers::auth::request_password_reset))
        .route("/password-reset/confirm", post(handlers::auth::confirm_password_reset))
        .merge(
            Router::new()
                .route("/session", get(handlers::auth::session))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_auth,
                )),
        )
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(turf_routes(state.clone()))
        .merge(booking_routes(state.clone()))
        .merge(profile_routes(state.clone()))
        .nest("/owner", owner_routes(state.clone()))
        .nest("/admin", admin_routes(state))
}

fn turf_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public catalog
        .route("/turfs", get(handlers::turfs::list))
        .route("/turfs/:id", get(handlers::turfs::get))
        .route("/turfs/:id/availability", get(handlers::turfs::availability))
        .route("/turfs/:id/slots", get(handlers::turfs::slots))
        // Listing management
        .merge(
            Router::new()
                .route("/turfs", post(handlers::turfs::create))
                .route("/turfs/:id", put(handlers::turfs::update).delete(handlers::turfs::delete))
                .route("/turfs/:id/active", patch(handlers::turfs::set_active))
                .route("/turfs/:id/bookings", get(handlers::turfs::bookings))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_turf_manager,
                )),
        )
}

fn booking_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/bookings", get(handlers::bookings::list_mine).post(handlers::bookings::create))
        .route("/bookings/upcoming", get(handlers::bookings::upcoming))
        .route("/bookings/:id/cancel", post(handlers::bookings::cancel))
        .route("/bookings/:id/confirm-payment", post(handlers::bookings::confirm_payment))
        .route("/bookings/:id/fail-payment", post(handlers::bookings::fail_payment))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn profile_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::profile::me).put(handlers::profile::update_me))
        .route("/profile/events", get(handlers::profile::events))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn owner_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/turfs", get(handlers::turfs::owner_turfs))
        .route("/bookings", get(handlers::turfs::owner_bookings))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_turf_manager,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profiles", get(handlers::admin::list_profiles))
        .route("/profiles/:id/role", put(handlers::admin::set_role))
        .route("/turf-owners", post(handlers::admin::create_turf_owner))
        .route("/turfs", get(handlers::admin::list_turfs))
        .route("/bookings", get(handlers::admin::list_bookings))
        .route("/stats", get(handlers::admin::stats))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
