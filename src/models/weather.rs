//! Weather report returned by the weather endpoint.

use serde::{Deserialize, Serialize};

/// Current conditions at a location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temperature: f64,
    pub weather_description: String,
    pub weather_icon: String,
    pub windspeed: f64,
}

/// Today's temperature range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyRange {
    pub max_temp: f64,
    pub min_temp: f64,
}

/// Formatted weather for display next to an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub daily: Option<DailyRange>,
}
