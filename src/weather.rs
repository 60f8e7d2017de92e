//! Forecast fetcher for the Open-Meteo API
//!
//! One GET per call with a fixed set of hourly and daily variables, times in
//! GMT. There is no retry: a failure is reported to the caller once.

use crate::config::WeatherConfig;
use crate::models::{Coordinate, ForecastDocument};
use crate::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Hourly variables requested for every forecast
pub const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "relativehumidity_2m",
    "dewpoint_2m",
    "apparent_temperature",
    "precipitation_probability",
    "precipitation",
    "rain",
    "showers",
    "snowfall",
    "snow_depth",
    "weathercode",
    "surface_pressure",
    "windspeed_180m",
    "winddirection_180m",
    "temperature_180m",
    "soil_temperature_54cm",
    "soil_moisture_27_81cm",
    "uv_index",
    "uv_index_clear_sky",
    "is_day",
];

/// Daily variables requested for every forecast
pub const DAILY_FIELDS: &[&str] = &[
    "weathercode",
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "sunrise",
    "sunset",
    "uv_index_max",
    "uv_index_clear_sky_max",
    "precipitation_sum",
    "rain_sum",
    "showers_sum",
    "snowfall_sum",
    "precipitation_hours",
    "precipitation_probability_max",
    "windspeed_10m_max",
    "windgusts_10m_max",
    "winddirection_10m_dominant",
    "shortwave_radiation_sum",
    "et0_fao_evapotranspiration",
];

/// Timezone all timestamps are reported in
pub const FORECAST_TIMEZONE: &str = "GMT";

/// Anything able to produce a forecast document for a coordinate
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_forecast(&self, coordinate: Coordinate) -> Result<ForecastDocument>;
}

/// Error body returned by Open-Meteo on 4xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: String,
}

/// HTTP client for the Open-Meteo forecast endpoint
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    forecast_url: String,
}

impl OpenMeteoClient {
    /// Create a new client from weather configuration
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            "weather-dashboard/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| DashboardError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            forecast_url: format!("{}/forecast", config.base_url.trim_end_matches('/')),
        })
    }

    /// Query parameters for one forecast request
    #[must_use]
    pub fn query(coordinate: Coordinate) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", coordinate.latitude.to_string()),
            ("longitude", coordinate.longitude.to_string()),
            ("hourly", HOURLY_FIELDS.join(",")),
            ("daily", DAILY_FIELDS.join(",")),
            ("timezone", FORECAST_TIMEZONE.to_string()),
        ]
    }

    /// Fetch the forecast for a coordinate
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    pub async fn get_forecast(&self, coordinate: Coordinate) -> Result<ForecastDocument> {
        let start_time = Instant::now();
        debug!("Requesting forecast from {}", self.forecast_url);

        let response = self
            .client
            .get(&self.forecast_url)
            .query(&Self::query(coordinate))
            .send()
            .await
            .map_err(|e| {
                warn!("Network error while fetching forecast: {}", e);
                DashboardError::network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.reason)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            error!("Forecast request failed with status {}: {}", status, reason);
            return Err(DashboardError::network(format!(
                "API request failed with status {status}: {reason}"
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            warn!("Failed to read forecast body: {}", e);
            DashboardError::network(e.to_string())
        })?;

        let body: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            error!("Failed to parse forecast response: {}", e);
            DashboardError::parse(format!("Invalid forecast data received: {e}"))
        })?;
        let document = ForecastDocument::from_json(body).inspect_err(|e| {
            error!("Rejected forecast response: {}", e);
        })?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved forecast with {} hourly samples in {:.3}s",
            document.hour_count(),
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow forecast API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(document)
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn fetch_forecast(&self, coordinate: Coordinate) -> Result<ForecastDocument> {
        self.get_forecast(coordinate).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_contains_fixed_fields() {
        let query = OpenMeteoClient::query(Coordinate::new(52.52, 13.41));
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(get("latitude"), "52.52");
        assert_eq!(get("longitude"), "13.41");
        assert_eq!(get("timezone"), "GMT");
        assert!(get("hourly").starts_with("temperature_2m,relativehumidity_2m,"));
        assert!(get("hourly").ends_with(",is_day"));
        assert!(get("daily").contains("winddirection_10m_dominant"));
        assert_eq!(get("daily").split(',').count(), DAILY_FIELDS.len());
    }

    #[test]
    fn test_forecast_url_trims_trailing_slash() {
        let config = WeatherConfig {
            base_url: "http://localhost:1234/v1/".to_string(),
            timeout_seconds: Some(5),
        };
        let client = OpenMeteoClient::new(&config).unwrap();
        assert_eq!(client.forecast_url, "http://localhost:1234/v1/forecast");
    }
}
