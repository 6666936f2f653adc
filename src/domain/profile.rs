use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A user's profile. `id` is the identity id from `users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    TurfOwner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::TurfOwner => "turf_owner",
            Role::Admin => "admin",
        }
    }

    /// Where a signed-in user of this role lands by default.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::TurfOwner => "/owner/dashboard",
            Role::Customer => "/customer/home",
        }
    }

    pub fn can_manage_turfs(&self) -> bool {
        matches!(self, Role::TurfOwner | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "turf_owner" => Ok(Role::TurfOwner),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    /// Only `customer` and `turf_owner` may be chosen at sign-up.
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

/// Row data for a new identity + profile pair.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
}

pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_lower && has_upper && has_digit {
        return Ok(());
    }

    let mut err = ValidationError::new("password_strength");
    err.message = Some(
        "Password must be at least 8 characters with a lowercase letter, an uppercase letter and a number"
            .into(),
    );
    Err(err)
}

/// E.164-ish: optional `+`, a non-zero leading digit, 2 to 15 digits total.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (2..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Please enter a valid phone number".into());
        Err(err)
    }
}
