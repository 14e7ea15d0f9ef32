//! Event API endpoints.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};

use super::{created, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateEventRequest, Event, Location, UpdateEventRequest};
use crate::AppState;

/// GET /api/events - List all events.
pub async fn list_events(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    let events = state.store.list_all().await?;
    success(events)
}

/// GET /api/events/:id - Get a single event.
pub async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Event> {
    match state.store.get_by_id(&id).await? {
        Some(event) => success(event),
        None => Err(AppError::NotFound(format!("Event {} not found", id))),
    }
}

/// POST /api/events - Create a new event from a JSON body.
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> ApiResult<Event> {
    let event = state.store.create(request).await?;
    created(event)
}

/// POST /api/events/create - Create a new event from a multipart form.
///
/// Fields: `title`, `date`, `location` (JSON object or plain name),
/// `description` and an optional `image` file.
pub async fn create_event_form(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Event> {
    let mut request = CreateEventRequest::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => request.title = field.text().await?,
            "date" => request.date = field.text().await?,
            "description" => request.description = field.text().await?,
            "location" => request.location = Some(parse_location_field(&field.text().await?)?),
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was chosen
                if !bytes.is_empty() {
                    image = Some((file_name, content_type, bytes));
                }
            }
            _ => {}
        }
    }

    // Reject bad forms before storing the image
    request.validate()?;

    let saved_image = match image {
        Some((file_name, content_type, bytes)) => Some(
            state
                .uploads
                .save(file_name.as_deref(), content_type.as_deref(), &bytes)
                .await?,
        ),
        None => None,
    };
    request.image = saved_image.clone();

    match state.store.create(request).await {
        Ok(event) => created(event),
        Err(e) => {
            // No event points at the image, so don't leave it behind
            if let Some(path) = &saved_image {
                state.uploads.remove(path).await;
            }
            Err(e)
        }
    }
}

/// PUT /api/events/:id - Update an event.
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> ApiResult<Event> {
    let event = state.store.update(&id, &request).await?;
    success(event)
}

/// DELETE /api/events/:id - Delete an event.
pub async fn delete_event(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.store.delete(&id).await?;
    success(())
}

fn parse_location_field(raw: &str) -> Result<Location, AppError> {
    let raw = raw.trim();
    if raw.starts_with('{') || raw.starts_with('"') {
        serde_json::from_str(raw)
            .map_err(|_| AppError::Validation("Invalid location format".to_string()))
    } else {
        Ok(Location::named(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location_field() {
        let location = parse_location_field(
            r#"{"name":"Miami, FL","coordinates":{"latitude":"25.7617","longitude":"-80.1918"}}"#,
        )
        .unwrap();
        assert_eq!(location.name, "Miami, FL");
        assert!(location.coordinates.is_some());

        assert_eq!(
            parse_location_field(" Boston, MA ").unwrap(),
            Location::named("Boston, MA")
        );
        assert!(matches!(
            parse_location_field("{ broken"),
            Err(AppError::Validation(_))
        ));
    }
}
