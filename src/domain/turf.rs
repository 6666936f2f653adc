use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turf {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub location: String,
    pub sport: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: f64,
    pub price_per_hour: f64,
    pub capacity: i64,
    pub amenities: Vec<String>,
    pub rating: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of a turf shown next to a booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurfSummary {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub sport: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTurfRequest {
    #[validate(length(min = 1, max = 100, message = "Turf name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub location: String,
    #[validate(length(min = 1, message = "Sport is required"))]
    pub sport: String,
    #[validate(length(max = 500, message = "Description is too long"))]
    pub description: Option<String>,
    pub image: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be positive"))]
    pub price: f64,
    #[validate(range(exclusive_min = 0.0, message = "Hourly price must be positive"))]
    pub price_per_hour: f64,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i64,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub rating: Option<f64>,
    /// Admins may list a turf on behalf of an owner; ignored for owners.
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTurfRequest {
    #[validate(length(min = 1, max = 100, message = "Turf name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub location: Option<String>,
    #[validate(length(min = 1, message = "Sport is required"))]
    pub sport: Option<String>,
    #[validate(length(max = 500, message = "Description is too long"))]
    pub description: Option<String>,
    pub image: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be positive"))]
    pub price: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "Hourly price must be positive"))]
    pub price_per_hour: Option<f64>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i64>,
    pub amenities: Option<Vec<String>>,
}

/// Catalog filters. `sport` matches case-insensitively, `location` by substring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurfFilter {
    pub sport: Option<String>,
    pub location: Option<String>,
}

/// A fully-formed turf row ready for insertion.
#[derive(Debug, Clone)]
pub struct NewTurf {
    pub owner_id: Uuid,
    pub name: String,
    pub location: String,
    pub sport: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: f64,
    pub price_per_hour: f64,
    pub capacity: i64,
    pub amenities: Vec<String>,
    pub rating: f64,
}

pub const DEFAULT_TURF_RATING: f64 = 4.0;

impl NewTurf {
    pub fn from_request(owner_id: Uuid, request: CreateTurfRequest) -> Self {
        Self {
            owner_id,
            name: request.name.trim().to_string(),
            location: request.location.trim().to_string(),
            sport: request.sport.trim().to_string(),
            description: request.description,
            image: request.image,
            price: request.price,
            price_per_hour: request.price_per_hour,
            capacity: request.capacity,
            amenities: request.amenities,
            rating: request.rating.unwrap_or(DEFAULT_TURF_RATING),
        }
    }
}
