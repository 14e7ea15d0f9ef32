//! Weather API endpoints.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{Location, WeatherReport};
use crate::AppState;

/// Weather query parameters.
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    /// Location name, e.g. "Austin, TX".
    #[serde(default)]
    pub location: Option<String>,
}

/// GET /api/weather?location=... - Weather for a location name.
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<WeatherReport> {
    let name = query
        .location
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Location parameter is required".to_string()))?;

    let report = state.weather.for_location(&Location::named(name)).await?;
    success(report)
}

/// GET /api/events/:id/weather - Weather at an event's location.
pub async fn get_event_weather(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WeatherReport> {
    let event = state
        .store
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;

    let report = state.weather.for_location(&event.location).await?;
    success(report)
}
