//! Open-Meteo forecast document
//!
//! The document mirrors the API response: an `hourly` block of parallel
//! series aligned with `hourly.time`, and a `daily` block of parallel series
//! aligned with `daily.sunrise`. Series are kept by their API field name so
//! any requested variable can be charted without a dedicated struct field.

use crate::DashboardError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A forecast for one coordinate, as returned by the weather API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_units: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly: Option<HourlyBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_units: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<DailyBlock>,
    /// Response body exactly as received, when decoded via `from_json`
    #[serde(skip)]
    raw: Option<Value>,
}

/// Hourly parallel series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyBlock {
    #[serde(with = "open_meteo_time")]
    pub time: Vec<NaiveDateTime>,
    /// Every other hourly variable, keyed by API field name
    #[serde(flatten)]
    pub series: BTreeMap<String, Vec<Option<f64>>>,
}

/// Daily parallel series; index 0 is today
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyBlock {
    #[serde(default)]
    pub time: Vec<NaiveDate>,
    #[serde(default, with = "open_meteo_time")]
    pub sunrise: Vec<NaiveDateTime>,
    #[serde(default, with = "open_meteo_time")]
    pub sunset: Vec<NaiveDateTime>,
    #[serde(flatten)]
    pub series: BTreeMap<String, Vec<Option<f64>>>,
}

impl HourlyBlock {
    /// Values of the named series, if present
    #[must_use]
    pub fn series(&self, field: &str) -> Option<&[Option<f64>]> {
        self.series.get(field).map(Vec::as_slice)
    }
}

impl DailyBlock {
    /// Today's value of the named series
    #[must_use]
    pub fn today(&self, field: &str) -> Option<f64> {
        self.series.get(field).and_then(|values| values.first().copied().flatten())
    }
}

impl ForecastDocument {
    /// Decode and validate a response body, keeping the body itself
    pub fn from_json(value: Value) -> crate::Result<Self> {
        let mut document = Self::deserialize(&value)
            .map_err(|e| DashboardError::parse(format!("Invalid forecast data received: {e}")))?;
        document.validate()?;
        document.raw = Some(value);
        Ok(document)
    }

    /// The upstream body this document was decoded from
    #[must_use]
    pub fn raw_json(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    /// Check that every series is aligned with its block's reference axis.
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(hourly) = &self.hourly {
            let expected = hourly.time.len();
            for (name, values) in &hourly.series {
                if values.len() != expected {
                    return Err(DashboardError::parse(format!(
                        "hourly series '{name}' has {} values but hourly.time has {expected}",
                        values.len()
                    )));
                }
            }
        }

        if let Some(daily) = &self.daily {
            let expected = daily.sunrise.len();
            if !daily.time.is_empty() && daily.time.len() != expected {
                return Err(DashboardError::parse(format!(
                    "daily.time has {} values but daily.sunrise has {expected}",
                    daily.time.len()
                )));
            }
            if daily.sunset.len() != expected {
                return Err(DashboardError::parse(format!(
                    "daily.sunset has {} values but daily.sunrise has {expected}",
                    daily.sunset.len()
                )));
            }
            for (name, values) in &daily.series {
                if values.len() != expected {
                    return Err(DashboardError::parse(format!(
                        "daily series '{name}' has {} values but daily.sunrise has {expected}",
                        values.len()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Number of hourly samples
    #[must_use]
    pub fn hour_count(&self) -> usize {
        self.hourly.as_ref().map_or(0, |hourly| hourly.time.len())
    }
}

/// Open-Meteo ISO-8601 local timestamps without offset (`2024-01-01T13:00`)
pub mod open_meteo_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";
    const SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    /// Parse a single timestamp, accepting an optional seconds component
    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw, MINUTE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, SECOND_FORMAT))
    }

    pub fn serialize<S>(times: &[NaiveDateTime], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(times.iter().map(|t| t.format(MINUTE_FORMAT).to_string()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        raw.iter()
            .map(|s| parse(s).map_err(|e| D::Error::custom(format!("invalid timestamp '{s}': {e}"))))
            .collect()
    }
}
