//! Configuration management for `routecast`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::RoutecastError;
use crate::route::{DEFAULT_SECONDS_PER_SEGMENT, MAX_INTERMEDIATE_COUNT};
use crate::units::UnitSystem;
use crate::weather::DEFAULT_FORECAST_HORIZON_HOURS;
use ::config::{Config, Environment, File};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutecastConfig {
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Geocoding service configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Waypoint placement and fetch settings
    #[serde(default)]
    pub route: RouteConfig,
    /// Unit preference
    #[serde(default)]
    pub units: UnitsConfig,
    /// Saved route storage
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Language of weather descriptions
    #[serde(default = "default_weather_language")]
    pub language: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Transport-level retries for transient HTTP failures
    #[serde(default)]
    pub max_retries: u32,
    /// How far ahead the periodic forecast reaches
    #[serde(default = "default_forecast_horizon")]
    pub forecast_horizon_hours: u32,
}

/// Geocoding service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// User agent sent to Nominatim (required by its usage policy)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Reverse geocode intermediate waypoints for display names
    #[serde(default)]
    pub name_waypoints: bool,
}

/// Waypoint placement and fetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Waypoints strictly between departure and arrival
    #[serde(default = "default_intermediate_count")]
    pub intermediate_count: usize,
    /// Estimated travel time between consecutive waypoints
    #[serde(default = "default_seconds_per_segment")]
    pub seconds_per_segment: u32,
    /// Upper bound on weather lookups in flight
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

/// Unit preference
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnitsConfig {
    /// `celsius`/`metric` or `fahrenheit`/`imperial`
    #[serde(default)]
    pub temperature: UnitSystem,
}

/// Saved route storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the saved route database
    #[serde(default = "default_storage_path")]
    pub path: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_language() -> String {
    "fr".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_forecast_horizon() -> u32 {
    DEFAULT_FORECAST_HORIZON_HOURS
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    crate::http::USER_AGENT.to_string()
}

fn default_intermediate_count() -> usize {
    3
}

fn default_seconds_per_segment() -> u32 {
    DEFAULT_SECONDS_PER_SEGMENT
}

fn default_max_concurrent_fetches() -> usize {
    8
}

fn default_storage_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("routecast").join("routes"))
        .unwrap_or_else(|| PathBuf::from(".routecast/routes"))
        .to_string_lossy()
        .into_owned()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl WeatherConfig {
    /// The API key, or a configuration error when it is missing or empty
    pub fn require_api_key(&self) -> crate::Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                RoutecastError::config(
                    "Weather API key is required. Set weather.api_key or ROUTECAST_WEATHER__API_KEY.",
                )
            })
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            language: default_weather_language(),
            timeout_seconds: default_timeout(),
            max_retries: 0,
            forecast_horizon_hours: default_forecast_horizon(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
            name_waypoints: false,
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            intermediate_count: default_intermediate_count(),
            seconds_per_segment: default_seconds_per_segment(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for RoutecastConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            geocoding: GeocodingConfig::default(),
            route: RouteConfig::default(),
            units: UnitsConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RoutecastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(::config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. ROUTECAST_WEATHER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("ROUTECAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: RoutecastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("routecast").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.language.is_empty() {
            self.weather.language = default_weather_language();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_timeout();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.user_agent.is_empty() {
            self.geocoding.user_agent = default_user_agent();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_timeout();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the weather API key, when one is set
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.weather.api_key {
            if api_key.is_empty() {
                return Err(RoutecastError::config(
                    "Weather API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 || api_key.len() > 100 {
                return Err(RoutecastError::config(
                    "Weather API key appears to be invalid. Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 || self.geocoding.timeout_seconds > 300 {
            return Err(RoutecastError::config("Request timeout cannot exceed 300 seconds").into());
        }

        if self.weather.max_retries > 10 {
            return Err(RoutecastError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.weather.forecast_horizon_hours == 0
            || self.weather.forecast_horizon_hours > DEFAULT_FORECAST_HORIZON_HOURS
        {
            return Err(RoutecastError::config(format!(
                "Forecast horizon must be between 1 and {DEFAULT_FORECAST_HORIZON_HOURS} hours"
            ))
            .into());
        }

        if self.route.intermediate_count > MAX_INTERMEDIATE_COUNT {
            return Err(RoutecastError::config(format!(
                "Intermediate waypoint count cannot exceed {MAX_INTERMEDIATE_COUNT}"
            ))
            .into());
        }

        if self.route.seconds_per_segment == 0 {
            return Err(RoutecastError::config("Seconds per segment must be positive").into());
        }

        if self.route.max_concurrent_fetches == 0 {
            return Err(
                RoutecastError::config("Maximum concurrent fetches must be at least 1").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RoutecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RoutecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather API", &self.weather.base_url),
            ("Geocoding", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(RoutecastError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
