//! Error types and handling for `routecast`

use thiserror::Error;

/// Main error type for route weather computations
#[derive(Error, Debug)]
pub enum RoutecastError {
    /// A place name could not be geocoded
    #[error("Endpoint could not be resolved: {place}")]
    EndpointUnresolved { place: String },

    /// The geocoding service itself failed while resolving a place
    #[error("Geocoding failed for '{place}': {source}")]
    Geocoding {
        place: String,
        #[source]
        source: FetchError,
    },

    /// A route point could not be normalized into a coordinate
    #[error("Malformed point #{ordinal}: {message}")]
    MalformedPoint { ordinal: usize, message: String },

    /// A single weather lookup failed
    #[error("Weather fetch failed: {0}")]
    WeatherFetchFailed(#[from] FetchError),

    /// Every waypoint of the route failed its weather lookup
    #[error("Weather unavailable for all {} waypoints", reasons.len())]
    AllPointsFailed { reasons: Vec<String> },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Saved route storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Failures of the HTTP collaborators (weather source, geocoder)
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("forecast series is empty")]
    EmptySeries,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::InvalidResponse(err.to_string())
        } else {
            FetchError::Request(reqwest_middleware::Error::Reqwest(err))
        }
    }
}

impl RoutecastError {
    /// Create a new endpoint-unresolved error
    pub fn endpoint_unresolved<S: Into<String>>(place: S) -> Self {
        Self::EndpointUnresolved {
            place: place.into(),
        }
    }

    /// Create a new malformed point error
    pub fn malformed_point<S: Into<String>>(ordinal: usize, message: S) -> Self {
        Self::MalformedPoint {
            ordinal,
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether the whole route computation is worth retrying as-is
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RoutecastError::Geocoding { .. }
                | RoutecastError::WeatherFetchFailed(_)
                | RoutecastError::AllPointsFailed { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RoutecastError::EndpointUnresolved { place } => {
                format!("Place not found: {place}. Check the spelling and try again.")
            }
            RoutecastError::Geocoding { .. } => {
                "Unable to look up places. Please check your internet connection.".to_string()
            }
            RoutecastError::MalformedPoint { ordinal, .. } => {
                format!("Route point #{ordinal} has invalid coordinates.")
            }
            RoutecastError::WeatherFetchFailed(_) => {
                "Weather unavailable. Check your connection and API key.".to_string()
            }
            RoutecastError::AllPointsFailed { .. } => {
                "Weather could not be loaded for any point of the route. Run the command again to retry."
                    .to_string()
            }
            RoutecastError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            RoutecastError::Storage { .. } => {
                "Saved routes could not be accessed. You may need to clear them.".to_string()
            }
            RoutecastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
