//! Weather dashboard - pick a country and city, fetch an Open-Meteo forecast,
//! and render headline metrics plus hourly temperature and humidity charts.
//!
//! This library provides the location selector, the forecast fetcher, the
//! presentation derivations, the dashboard state reducer and the HTTP layer
//! serving it.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod locations;
pub mod logging;
pub mod models;
pub mod presentation;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::DashboardConfig;
pub use dashboard::{Action, CityRejection, DashboardSession, DashboardState, Effect, Selection};
pub use error::DashboardError;
pub use locations::{GeoProvider, StaticGeoProvider};
pub use models::{ChartPoint, City, Coordinate, Country, ForecastDocument};
pub use presentation::{DashboardView, HeadlineMetrics, derive_headline_metrics, derive_hourly_series};
pub use weather::{ForecastSource, OpenMeteoClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
