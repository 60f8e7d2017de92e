//! Presentation layer
//!
//! Pure derivations from the current forecast document: the three headline
//! metrics, today's daylight window, and the two hour-of-day chart series.
//! An absent document yields blank metrics and empty series.

use crate::dashboard::DashboardState;
use crate::models::{ChartPoint, ChartSeries, ChartWidget, Coordinate, ForecastDocument};
use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

pub const TEMPERATURE_FIELD: &str = "temperature_2m";
pub const HUMIDITY_FIELD: &str = "relativehumidity_2m";
pub const MAX_APPARENT_TEMPERATURE_FIELD: &str = "apparent_temperature_max";
pub const MIN_APPARENT_TEMPERATURE_FIELD: &str = "apparent_temperature_min";
pub const DOMINANT_WIND_DIRECTION_FIELD: &str = "winddirection_10m_dominant";

/// Today's scalar summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    /// Apparent temperature maximum, °C
    pub max_temp: Option<f64>,
    /// Apparent temperature minimum, °C
    pub min_temp: Option<f64>,
    /// Dominant wind direction, degrees
    pub wind_direction: Option<f64>,
}

/// Today's sunrise and sunset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Daylight {
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
}

/// Read index 0 of today's apparent temperature extremes and wind direction
#[must_use]
pub fn derive_headline_metrics(doc: Option<&ForecastDocument>) -> HeadlineMetrics {
    let Some(daily) = doc.and_then(|d| d.daily.as_ref()) else {
        return HeadlineMetrics::default();
    };

    HeadlineMetrics {
        max_temp: daily.today(MAX_APPARENT_TEMPERATURE_FIELD),
        min_temp: daily.today(MIN_APPARENT_TEMPERATURE_FIELD),
        wind_direction: daily.today(DOMINANT_WIND_DIRECTION_FIELD),
    }
}

/// Pair each hourly timestamp's hour-of-day with the named series' value.
///
/// Follows the source order of `hourly.time` without sorting or dedup. A
/// missing series produces null values so the x-axis keeps its length.
#[must_use]
pub fn derive_hourly_series(doc: Option<&ForecastDocument>, field: &str) -> Vec<ChartPoint> {
    let Some(hourly) = doc.and_then(|d| d.hourly.as_ref()) else {
        return Vec::new();
    };
    let values = hourly.series(field).unwrap_or_default();

    hourly
        .time
        .iter()
        .enumerate()
        .map(|(i, time)| ChartPoint {
            time: time.hour(),
            value: values.get(i).copied().flatten(),
        })
        .collect()
}

/// Area chart of hourly temperature
#[must_use]
pub fn temperature_chart(doc: Option<&ForecastDocument>) -> ChartSeries {
    ChartSeries {
        title: "Temperature over time (C)",
        label: "Temperature (C)",
        points: derive_hourly_series(doc, TEMPERATURE_FIELD),
    }
}

/// Line chart of hourly relative humidity
#[must_use]
pub fn humidity_chart(doc: Option<&ForecastDocument>) -> ChartSeries {
    ChartSeries {
        title: "Humidity over time",
        label: "Humidity",
        points: derive_hourly_series(doc, HUMIDITY_FIELD),
    }
}

#[must_use]
pub fn derive_daylight(doc: Option<&ForecastDocument>) -> Daylight {
    let Some(daily) = doc.and_then(|d| d.daily.as_ref()) else {
        return Daylight::default();
    };
    Daylight {
        sunrise: daily.sunrise.first().copied(),
        sunset: daily.sunset.first().copied(),
    }
}

/// Short 12-hour clock time, e.g. `7:04 AM`
#[must_use]
pub fn format_clock_time(time: NaiveDateTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Convert wind direction from degrees to a 16-point cardinal direction
#[must_use]
pub fn wind_direction_to_cardinal(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return "Unknown";
    }
    let normalized = degrees.rem_euclid(360.0).round() as u16;
    match normalized {
        0..=11 | 349..=360 => "N",
        12..=33 => "NNE",
        34..=56 => "NE",
        57..=78 => "ENE",
        79..=101 => "E",
        102..=123 => "ESE",
        124..=146 => "SE",
        147..=168 => "SSE",
        169..=191 => "S",
        192..=213 => "SSW",
        214..=236 => "SW",
        237..=258 => "WSW",
        259..=281 => "W",
        282..=303 => "WNW",
        304..=326 => "NW",
        327..=348 => "NNW",
        _ => "Unknown",
    }
}

/// Headline metrics as shown on the cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub max_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_cardinal: Option<&'static str>,
}

/// Everything the dashboard page renders, derived from one state snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub country: Option<String>,
    pub city: Option<String>,
    /// `Country | City`
    pub location_label: String,
    pub coordinates: Option<Coordinate>,
    /// `Latitude: .. | Longitude: ..` for the selected city
    pub coordinates_label: Option<String>,
    pub city_selection_enabled: bool,
    pub fetch_enabled: bool,
    pub loading: bool,
    pub error_message: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub metrics: MetricsView,
    pub temperature_chart: ChartWidget,
    pub humidity_chart: ChartWidget,
}

impl From<&DashboardState> for DashboardView {
    fn from(state: &DashboardState) -> Self {
        let doc = state.forecast.as_deref();
        let selection = &state.selection;

        let country = selection.country.as_ref().map(|c| c.name.clone());
        let city = selection.city.as_ref().map(|c| c.name.clone());
        let location_label = format!(
            "{} | {}",
            country.as_deref().unwrap_or_default(),
            city.as_deref().unwrap_or_default()
        );

        let metrics = derive_headline_metrics(doc);
        let daylight = derive_daylight(doc);

        Self {
            country,
            city,
            location_label,
            coordinates: selection.city.as_ref().map(|c| c.coordinate),
            coordinates_label: selection
                .city
                .as_ref()
                .map(|c| c.coordinate.format_coordinates()),
            city_selection_enabled: state.city_selection_enabled(),
            fetch_enabled: state.fetch_enabled(),
            loading: state.is_loading(),
            error_message: state.error_message.clone(),
            sunrise: daylight.sunrise.map(format_clock_time),
            sunset: daylight.sunset.map(format_clock_time),
            metrics: MetricsView {
                max_temp: metrics.max_temp,
                min_temp: metrics.min_temp,
                wind_direction: metrics.wind_direction,
                wind_cardinal: metrics.wind_direction.map(wind_direction_to_cardinal),
            },
            temperature_chart: temperature_chart(doc).to_widget(),
            humidity_chart: humidity_chart(doc).to_widget(),
        }
    }
}
