//! Event model matching the frontend Event interface and the on-disk store layout.

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Geographic coordinates of an event location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where an event takes place.
///
/// Always serialized in the structured form. Deserialization also accepts a
/// plain string, which becomes `{ "name": <string> }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "LocationRepr")]
pub struct Location {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinates: None,
        }
    }
}

/// Accepted input shapes for a location.
#[derive(Deserialize)]
#[serde(untagged)]
enum LocationRepr {
    Name(String),
    Structured {
        #[serde(default)]
        name: String,
        #[serde(default)]
        coordinates: Option<RawCoordinates>,
    },
}

/// Coordinates as submitted by forms, where values may be numbers, numeric
/// strings or empty strings.
#[derive(Deserialize)]
struct RawCoordinates {
    #[serde(default)]
    latitude: Value,
    #[serde(default)]
    longitude: Value,
}

fn coordinate_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl From<LocationRepr> for Location {
    fn from(repr: LocationRepr) -> Self {
        match repr {
            LocationRepr::Name(name) => Location::named(name),
            LocationRepr::Structured { name, coordinates } => {
                // Both halves must parse, otherwise the pair is dropped
                let coordinates = coordinates.and_then(|raw| {
                    Some(Coordinates {
                        latitude: coordinate_value(&raw.latitude)?,
                        longitude: coordinate_value(&raw.longitude)?,
                    })
                });
                Location { name, coordinates }
            }
        }
    }
}

/// A listed event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    /// Start time, RFC 3339.
    pub date: String,
    pub location: Location,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Set once at creation, never modified.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub attendees: Vec<String>,
}

impl Event {
    /// Merge the fields present in `patch` over this event.
    ///
    /// `id` and `created_at` are not part of the patch and stay untouched.
    pub fn apply(&mut self, patch: &UpdateEventRequest) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(image) = &patch.image {
            self.image = image.clone();
        }
        if let Some(attendees) = &patch.attendees {
            self.attendees = attendees.clone();
        }
    }
}

/// Request body for creating a new event.
///
/// Required fields default to empty so that a missing field is reported as a
/// validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Caller-chosen id; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
}

impl CreateEventRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        validate_date(&self.date)?;
        match &self.location {
            Some(location) if !location.name.trim().is_empty() => {}
            _ => return Err(AppError::Validation("Location is required".to_string())),
        }
        if self.description.trim().is_empty() {
            return Err(AppError::Validation("Description is required".to_string()));
        }
        if let Some(id) = &self.id {
            if id.trim().is_empty() {
                return Err(AppError::Validation("Event id must not be blank".to_string()));
            }
        }
        Ok(())
    }
}

/// Request body for updating an existing event.
///
/// Fields left out keep their current value. `id` and `createdAt` in the body
/// are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub description: Option<String>,
    /// `Some(None)` when the body sends `"image": null`.
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
}

/// Mark a field as present, so an explicit `null` differs from a missing field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateEventRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("Title must not be empty".to_string()));
            }
        }
        if let Some(date) = &self.date {
            validate_date(date)?;
        }
        if let Some(location) = &self.location {
            if location.name.trim().is_empty() {
                return Err(AppError::Validation(
                    "Location name must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn validate_date(date: &str) -> Result<(), AppError> {
    if date.trim().is_empty() {
        return Err(AppError::Validation("Date is required".to_string()));
    }
    DateTime::parse_from_rfc3339(date)
        .map(|_| ())
        .map_err(|e| AppError::Validation(format!("Date must be an ISO 8601 timestamp: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_location_normalizes() {
        let location: Location = serde_json::from_value(json!("Austin, TX")).unwrap();
        assert_eq!(location, Location::named("Austin, TX"));

        let out = serde_json::to_value(&location).unwrap();
        assert_eq!(out, json!({ "name": "Austin, TX" }));
    }

    #[test]
    fn test_structured_location_with_string_coordinates() {
        let location: Location = serde_json::from_value(json!({
            "name": "Pier 39",
            "coordinates": { "latitude": "37.8087", "longitude": -122.4098 }
        }))
        .unwrap();

        assert_eq!(location.name, "Pier 39");
        assert_eq!(
            location.coordinates,
            Some(Coordinates {
                latitude: 37.8087,
                longitude: -122.4098
            })
        );
    }

    #[test]
    fn test_blank_coordinates_are_dropped() {
        let location: Location = serde_json::from_value(json!({
            "name": "Somewhere",
            "coordinates": { "latitude": "", "longitude": "" }
        }))
        .unwrap();
        assert!(location.coordinates.is_none());
    }

    #[test]
    fn test_event_defaults_when_fields_missing() {
        let event: Event = serde_json::from_value(json!({
            "id": "e1",
            "title": "Launch",
            "date": "2024-05-01T18:00:00Z",
            "location": "Seattle, WA"
        }))
        .unwrap();

        assert!(event.attendees.is_empty());
        assert!(event.image.is_none());
        assert_eq!(event.location.name, "Seattle, WA");
    }

    #[test]
    fn test_update_request_ignores_id_and_created_at() {
        let patch: UpdateEventRequest = serde_json::from_value(json!({
            "id": "hijacked",
            "createdAt": "1999-01-01T00:00:00Z",
            "title": "Renamed"
        }))
        .unwrap();

        let mut event = Event {
            id: "e1".to_string(),
            title: "Original".to_string(),
            date: "2024-05-01T18:00:00Z".to_string(),
            location: Location::named("Boston, MA"),
            description: "desc".to_string(),
            image: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            attendees: vec![],
        };
        event.apply(&patch);

        assert_eq!(event.id, "e1");
        assert_eq!(event.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(event.title, "Renamed");
    }

    #[test]
    fn test_update_image_null_clears_and_missing_keeps() {
        let mut event = Event {
            id: "e1".to_string(),
            title: "Original".to_string(),
            date: "2024-05-01T18:00:00Z".to_string(),
            location: Location::named("Boston, MA"),
            description: "desc".to_string(),
            image: Some("/uploads/a.png".to_string()),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            attendees: vec![],
        };

        let keep: UpdateEventRequest = serde_json::from_value(json!({ "title": "T" })).unwrap();
        assert_eq!(keep.image, None);
        event.apply(&keep);
        assert_eq!(event.image.as_deref(), Some("/uploads/a.png"));

        let replace: UpdateEventRequest =
            serde_json::from_value(json!({ "image": "/uploads/b.png" })).unwrap();
        event.apply(&replace);
        assert_eq!(event.image.as_deref(), Some("/uploads/b.png"));

        let clear: UpdateEventRequest = serde_json::from_value(json!({ "image": null })).unwrap();
        assert_eq!(clear.image, Some(None));
        event.apply(&clear);
        assert_eq!(event.image, None);
    }

    #[test]
    fn test_create_validation() {
        let mut request = CreateEventRequest {
            title: "Meetup".to_string(),
            date: "2024-01-01T10:00:00Z".to_string(),
            location: Some(Location::named("Austin, TX")),
            description: "desc".to_string(),
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        request.date = "next tuesday".to_string();
        assert!(matches!(request.validate(), Err(AppError::Validation(_))));

        request.date = "2024-01-01T10:00:00Z".to_string();
        request.location = None;
        assert!(matches!(request.validate(), Err(AppError::Validation(_))));
    }
}
