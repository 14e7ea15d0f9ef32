//! Weather lookup against the Open-Meteo forecast API.
//!
//! Resolves event locations to coordinates and formats the forecast for display.

use std::time::Duration;

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Coordinates, CurrentWeather, DailyRange, Location, WeatherReport};

/// Fallback city when a location name is not in the table.
const DEFAULT_CITY: &str = "San Francisco, CA";

/// Coordinates for the cities used by the sample events.
const KNOWN_LOCATIONS: &[(&str, f64, f64)] = &[
    ("San Francisco, CA", 37.7749, -122.4194),
    ("New York, NY", 40.7128, -74.0060),
    ("Austin, TX", 30.2672, -97.7431),
    ("Seattle, WA", 47.6062, -122.3321),
    ("Chicago, IL", 41.8781, -87.6298),
    ("Los Angeles, CA", 34.0522, -118.2437),
    ("Boston, MA", 42.3601, -71.0589),
    ("Miami, FL", 25.7617, -80.1918),
];

/// Resolve a location name to coordinates.
///
/// Tries an exact match first, then a partial match in either direction, and
/// falls back to San Francisco.
pub fn coordinates_for_location(name: &str) -> Coordinates {
    let to_coords = |&(_, latitude, longitude): &(&str, f64, f64)| Coordinates {
        latitude,
        longitude,
    };

    if let Some(entry) = KNOWN_LOCATIONS.iter().find(|(city, ..)| *city == name) {
        return to_coords(entry);
    }

    if !name.is_empty() {
        if let Some(entry) = KNOWN_LOCATIONS
            .iter()
            .find(|(city, ..)| name.contains(city) || city.contains(name))
        {
            return to_coords(entry);
        }
    }

    tracing::warn!("No coordinates found for location: {}. Using default.", name);
    KNOWN_LOCATIONS
        .iter()
        .find(|(city, ..)| *city == DEFAULT_CITY)
        .map(to_coords)
        .unwrap_or(Coordinates {
            latitude: 37.7749,
            longitude: -122.4194,
        })
}

/// Map a WMO weather code to a description and an icon.
pub fn describe_weather_code(code: i64) -> (&'static str, &'static str) {
    match code {
        0 => ("Clear sky", "☀️"),
        1 => ("Mainly clear", "🌤️"),
        2 => ("Partly cloudy", "⛅"),
        3 => ("Overcast", "☁️"),
        45 => ("Fog", "🌫️"),
        48 => ("Depositing rime fog", "🌫️"),
        51 => ("Light drizzle", "🌦️"),
        53 => ("Moderate drizzle", "🌧️"),
        55 => ("Dense drizzle", "🌧️"),
        61 => ("Slight rain", "🌦️"),
        63 => ("Moderate rain", "🌧️"),
        65 => ("Heavy rain", "🌧️"),
        71 => ("Slight snow fall", "🌨️"),
        73 => ("Moderate snow fall", "❄️"),
        75 => ("Heavy snow fall", "❄️"),
        95 => ("Thunderstorm", "⛈️"),
        96 => ("Thunderstorm with slight hail", "⛈️"),
        99 => ("Thunderstorm with heavy hail", "⛈️"),
        _ => ("Unknown", "❓"),
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: ForecastCurrent,
    #[serde(default)]
    daily: Option<ForecastDaily>,
}

#[derive(Debug, Deserialize)]
struct ForecastCurrent {
    temperature: f64,
    weathercode: i64,
    windspeed: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastDaily {
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
}

fn format_forecast(forecast: ForecastResponse) -> WeatherReport {
    let (description, icon) = describe_weather_code(forecast.current.weathercode);

    let daily = forecast.daily.and_then(|daily| {
        Some(DailyRange {
            max_temp: *daily.temperature_2m_max.first()?,
            min_temp: *daily.temperature_2m_min.first()?,
        })
    });

    WeatherReport {
        current: CurrentWeather {
            temperature: forecast.current.temperature,
            weather_description: description.to_string(),
            weather_icon: icon.to_string(),
            windspeed: forecast.current.windspeed,
        },
        daily,
    }
}

/// HTTP client for the forecast API.
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Weather for an event location, preferring its stored coordinates.
    pub async fn for_location(&self, location: &Location) -> Result<WeatherReport, AppError> {
        let coords = location
            .coordinates
            .unwrap_or_else(|| coordinates_for_location(&location.name));
        self.fetch(coords).await
    }

    /// Fetch and format the forecast at `coords`.
    pub async fn fetch(&self, coords: Coordinates) -> Result<WeatherReport, AppError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("current", "temperature,weathercode,windspeed".to_string()),
                (
                    "daily",
                    "weathercode,temperature_2m_max,temperature_2m_min".to_string(),
                ),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Weather API responded with status: {}", status);
            return Err(AppError::Upstream(format!(
                "Weather API responded with status: {}",
                status
            )));
        }

        let forecast: ForecastResponse = response.json().await?;
        Ok(format_forecast(forecast))
    }
}
