use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Turfbook API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Sports turf listings and slot booking",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/auth/login",
            "turfs": "/api/turfs",
            "bookings": "/api/bookings",
            "dashboard": "/dashboard"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
