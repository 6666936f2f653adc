use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    pub password_reset_ttl_minutes: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Booking rules. Times are venue-local; `utc_offset_minutes` converts the
/// server clock into the venue's wall clock.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    pub cancellation_window_hours: i64,
    pub slot_minutes: i64,
    pub open_hour: u32,
    pub close_hour: u32,
    pub utc_offset_minutes: i32,
}

impl BookingConfig {
    /// Slot width in minutes when it fits inside one day.
    pub fn slot_length(&self) -> Option<u32> {
        u32::try_from(self.slot_minutes)
            .ok()
            .filter(|minutes| (1..=24 * 60).contains(minutes))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_length().is_none() {
            return Err(ConfigError::Message(format!(
                "booking.slot_minutes must be between 1 and 1440, got {}",
                self.slot_minutes
            )));
        }
        if self.open_hour >= self.close_hour || self.close_hour > 24 {
            return Err(ConfigError::Message(format!(
                "booking hours must satisfy open_hour < close_hour <= 24, got {}..{}",
                self.open_hour, self.close_hour
            )));
        }
        if self.cancellation_window_hours < 0 {
            return Err(ConfigError::Message(
                "booking.cancellation_window_hours must not be negative".to_string(),
            ));
        }
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Message(format!(
                "booking.utc_offset_minutes must be within a day, got {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            cancellation_window_hours: 12,
            slot_minutes: 60,
            open_hour: 6,
            close_hour: 23,
            utc_offset_minutes: 330,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://turfbook.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("auth.password_reset_ttl_minutes", 60)?
            .set_default("auth.secure_cookies", false)?
            .set_default("booking.cancellation_window_hours", 12)?
            .set_default("booking.slot_minutes", 60)?
            .set_default("booking.open_hour", 6)?
            .set_default("booking.close_hour", 23)?
            .set_default("booking.utc_offset_minutes", 330)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with TURFBOOK__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("TURFBOOK").separator("__"))

            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.booking.validate()?;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://turfbook.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                password_reset_ttl_minutes: 60,
                secure_cookies: false,
            },
            booking: BookingConfig::default(),
            email: None,
        }
    }
}
