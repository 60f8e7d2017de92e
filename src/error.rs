//! Error types and handling for the weather dashboard

use thiserror::Error;

/// Message shown when a fetch is triggered before a city is chosen.
pub const NO_CITY_SELECTED: &str = "Please select a city before fetching weather data.";

/// Main error type for the weather dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Input validation errors, raised before any network call
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Weather API communication errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Malformed or inconsistent forecast payloads
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Unknown country or city
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DashboardError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Validation { message } => message.clone(),
            DashboardError::Network { .. } => {
                "Unable to fetch weather data. Please check your internet connection and try again."
                    .to_string()
            }
            DashboardError::Parse { .. } => {
                "The weather service returned data that could not be read. Please try again later."
                    .to_string()
            }
            DashboardError::NotFound { message } => message.clone(),
            DashboardError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            DashboardError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::parse(err.to_string())
    }
}
