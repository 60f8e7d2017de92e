//! Chart series derived from hourly forecast data

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the x-axis key in widget data rows
pub const CHART_INDEX: &str = "Time";

/// One (hour-of-day, value) sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Hour of day on a 24-hour clock, 0..=23
    #[serde(rename = "Time")]
    pub time: u32,
    pub value: Option<f64>,
}

/// A labelled series ready for one chart card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Card heading
    pub title: &'static str,
    /// Category label, used as the value key in widget rows
    pub label: &'static str,
    pub points: Vec<ChartPoint>,
}

/// The shape consumed by the area/line chart widgets:
/// `{data: [{"Time": 0, "<label>": 5.0}], index: "Time", categories: ["<label>"]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartWidget {
    pub title: String,
    pub data: Vec<Map<String, Value>>,
    pub index: String,
    pub categories: Vec<String>,
}

impl ChartSeries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Convert into widget rows keyed by the series label
    #[must_use]
    pub fn to_widget(&self) -> ChartWidget {
        let data = self
            .points
            .iter()
            .map(|point| {
                let mut row = Map::new();
                row.insert(CHART_INDEX.to_string(), Value::from(point.time));
                row.insert(
                    self.label.to_string(),
                    point.value.map_or(Value::Null, Value::from),
                );
                row
            })
            .collect();

        ChartWidget {
            title: self.title.to_string(),
            data,
            index: CHART_INDEX.to_string(),
            categories: vec![self.label.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_serializes_time_key() {
        let point = ChartPoint {
            time: 13,
            value: Some(21.5),
        };
        assert_eq!(serde_json::to_value(point).unwrap(), json!({"Time": 13, "value": 21.5}));
    }

    #[test]
    fn test_widget_rows_use_label_as_key() {
        let series = ChartSeries {
            title: "Humidity over time",
            label: "Humidity",
            points: vec![
                ChartPoint { time: 0, value: Some(80.0) },
                ChartPoint { time: 1, value: None },
            ],
        };

        let widget = serde_json::to_value(series.to_widget()).unwrap();
        assert_eq!(
            widget,
            json!({
                "title": "Humidity over time",
                "data": [
                    {"Time": 0, "Humidity": 80.0},
                    {"Time": 1, "Humidity": null}
                ],
                "index": "Time",
                "categories": ["Humidity"]
            })
        );
    }
}
