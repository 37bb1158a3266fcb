//! Configuration module
//!
//! Reads TOML from `~/.config/borne-finder/config.toml` (overridable with
//! `BORNE_CONFIG`). Every field has a default so a partial or missing file
//! still yields a working configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Coordinate, DiscoveryResult};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("borne-finder")
        .join("config.toml")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub location: LocationConfig,
    pub search: SearchConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            location: LocationConfig::default(),
            search: SearchConfig::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// The configured fallback coordinate, validated.
    pub fn fallback_coordinate(&self) -> DiscoveryResult<Coordinate> {
        Coordinate::new(
            self.location.fallback_latitude,
            self.location.fallback_longitude,
        )
    }
}

/// Geolocation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Substitute center when positioning fails (default: Paris)
    pub fallback_latitude: f64,
    pub fallback_longitude: f64,
    /// Bound on the positioning call, in seconds
    pub timeout_secs: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback_latitude: 48.8566,
            fallback_longitude: 2.3522,
            timeout_secs: 10,
        }
    }
}

impl LocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Search defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_radius_km: f64,
    /// Queries shorter than this never hit the geocoder
    pub min_geocode_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_km: 5.0,
            min_geocode_query_len: 3,
        }
    }
}

/// Endpoints of the consumed collaborators
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub stations_base_url: String,
    pub geocoder_base_url: String,
    pub positioning_url: String,
    pub http_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            stations_base_url: "http://localhost:8080/api".to_string(),
            geocoder_base_url: "https://nominatim.openstreetmap.org".to_string(),
            positioning_url: "http://ip-api.com/json".to_string(),
            http_timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let cfg = AppConfig::default();
        assert!(cfg.fallback_coordinate().is_ok());
        assert_eq!(cfg.search.default_radius_km, 5.0);
        assert_eq!(cfg.search.min_geocode_query_len, 3);
        assert_eq!(cfg.location.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [location]
            fallback_latitude = 45.7640
            fallback_longitude = 4.8357

            [search]
            default_radius_km = 12.5
        "#,
        )
        .unwrap();
        assert_eq!(cfg.location.fallback_latitude, 45.7640);
        assert_eq!(cfg.search.default_radius_km, 12.5);
        // Untouched sections fall back to defaults
        assert_eq!(cfg.search.min_geocode_query_len, 3);
        assert_eq!(
            cfg.api.geocoder_base_url,
            "https://nominatim.openstreetmap.org"
        );
    }

    #[test]
    fn invalid_fallback_coordinate_is_rejected() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [location]
            fallback_latitude = 123.0
        "#,
        )
        .unwrap();
        assert!(cfg.fallback_coordinate().is_err());
    }
}
