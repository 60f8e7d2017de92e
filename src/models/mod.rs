//! Data models for the weather dashboard
//!
//! This module contains the core domain models organized by concern:
//! - Location: Coordinates, countries and cities
//! - Forecast: The Open-Meteo forecast document
//! - Chart: Derived hour-of-day series for the chart widgets

pub mod chart;
pub mod forecast;
pub mod location;

// Re-export all public types for convenient access
pub use chart::{ChartPoint, ChartSeries, ChartWidget};
pub use forecast::{DailyBlock, ForecastDocument, HourlyBlock};
pub use location::{City, Coordinate, Country};
