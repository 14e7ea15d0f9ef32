//! Event store operations over a single JSON file.
//!
//! Every mutation is a whole-file read-modify-write. Mutations are serialized
//! by one async mutex; reads go straight to the last written snapshot.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tokio::sync::Mutex;

use super::{FsStorage, Storage};
use crate::errors::AppError;
use crate::models::{CreateEventRequest, Event, UpdateEventRequest};

/// Contents written when a store is created without seed data.
const EMPTY_COLLECTION: &[u8] = b"[]";

/// JSON-file backed collection of events.
pub struct EventStore<S = FsStorage> {
    storage: S,
    store_path: PathBuf,
    seed_path: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl<S: Storage> EventStore<S> {
    pub fn new(storage: S, store_path: impl Into<PathBuf>, seed_path: Option<PathBuf>) -> Self {
        Self {
            storage,
            store_path: store_path.into(),
            seed_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Create the store file if it does not exist yet.
    ///
    /// Copies the seed file verbatim when one is present, otherwise writes an
    /// empty collection. An existing store file, even an empty one, is left
    /// alone.
    pub async fn initialize(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.initialize_locked().await
    }

    /// List all events in file order.
    pub async fn list_all(&self) -> Result<Vec<Event>, AppError> {
        if !self.store_exists().await? {
            self.initialize().await?;
        }
        self.read_events().await
    }

    /// Get an event by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        let events = self.list_all().await?;
        Ok(events.into_iter().find(|event| event.id == id))
    }

    /// Create a new event and persist it.
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event, AppError> {
        request.validate()?;

        let _guard = self.write_lock.lock().await;
        self.initialize_locked().await?;
        let mut events = self.read_events().await?;

        let id = match request.id {
            Some(id) => {
                if events.iter().any(|event| event.id == id) {
                    return Err(AppError::Conflict(format!("Event {} already exists", id)));
                }
                id
            }
            None => uuid::Uuid::new_v4().to_string(),
        };
        let location = request
            .location
            .ok_or_else(|| AppError::Validation("Location is required".to_string()))?;

        let event = Event {
            id,
            title: request.title,
            date: request.date,
            location,
            description: request.description,
            image: request.image,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            attendees: request.attendees.unwrap_or_default(),
        };

        events.push(event.clone());
        self.persist(&events).await?;

        tracing::info!(event_id = %event.id, "Created event");
        Ok(event)
    }

    /// Update an event, keeping its `id` and `created_at`.
    pub async fn update(&self, id: &str, patch: &UpdateEventRequest) -> Result<Event, AppError> {
        patch.validate()?;

        let _guard = self.write_lock.lock().await;
        self.initialize_locked().await?;
        let mut events = self.read_events().await?;

        let event = events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;
        event.apply(patch);
        let updated = event.clone();

        self.persist(&events).await?;

        tracing::info!(event_id = %id, "Updated event");
        Ok(updated)
    }

    /// Delete an event.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.initialize_locked().await?;
        let mut events = self.read_events().await?;

        let before = events.len();
        events.retain(|event| event.id != id);
        if events.len() == before {
            return Err(AppError::NotFound(format!("Event {} not found", id)));
        }

        self.persist(&events).await?;

        tracing::info!(event_id = %id, "Deleted event");
        Ok(())
    }

    /// Caller must hold `write_lock`.
    async fn initialize_locked(&self) -> Result<(), AppError> {
        if self.store_exists().await? {
            return Ok(());
        }

        if let Some(parent) = self
            .store_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            self.storage.make_directories(parent).await.map_err(|e| {
                AppError::StorageUnavailable(format!(
                    "Failed to create data directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let contents = match self.seed_contents().await? {
            Some(seed) => {
                tracing::info!(
                    "Seeding event store {:?} from {:?}",
                    self.store_path,
                    self.seed_path
                );
                seed
            }
            None => {
                tracing::info!("Creating empty event store {:?}", self.store_path);
                EMPTY_COLLECTION.to_vec()
            }
        };

        self.storage
            .write_all(&self.store_path, &contents)
            .await
            .map_err(|e| {
                AppError::StorageUnavailable(format!(
                    "Failed to create event store {}: {}",
                    self.store_path.display(),
                    e
                ))
            })
    }

    async fn seed_contents(&self) -> Result<Option<Vec<u8>>, AppError> {
        let Some(seed_path) = &self.seed_path else {
            return Ok(None);
        };
        let exists = self
            .storage
            .exists(seed_path)
            .await
            .map_err(|e| unavailable(seed_path, e))?;
        if !exists {
            return Ok(None);
        }
        self.storage
            .read_all(seed_path)
            .await
            .map(Some)
            .map_err(|e| unavailable(seed_path, e))
    }

    async fn store_exists(&self) -> Result<bool, AppError> {
        self.storage
            .exists(&self.store_path)
            .await
            .map_err(|e| unavailable(&self.store_path, e))
    }

    async fn read_events(&self) -> Result<Vec<Event>, AppError> {
        let bytes = self
            .storage
            .read_all(&self.store_path)
            .await
            .map_err(|e| unavailable(&self.store_path, e))?;
        parse_events(&bytes).map_err(|e| {
            tracing::warn!("Event store {:?} is malformed: {}", self.store_path, e);
            AppError::MalformedStore(format!(
                "Event store {} is not a valid event collection: {}",
                self.store_path.display(),
                e
            ))
        })
    }

    async fn persist(&self, events: &[Event]) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(events)
            .map_err(|e| AppError::Internal(format!("Failed to serialize events: {}", e)))?;

        self.storage
            .write_all(&self.store_path, &json)
            .await
            .map_err(|e| {
                tracing::error!("Failed to write event store {:?}: {}", self.store_path, e);
                AppError::Persistence(format!("Failed to save events: {}", e))
            })?;

        tracing::debug!(count = events.len(), "Persisted event store");
        Ok(())
    }
}

/// A blank file counts as an empty collection.
fn parse_events(bytes: &[u8]) -> Result<Vec<Event>, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes)
}

fn unavailable(path: &Path, err: std::io::Error) -> AppError {
    AppError::StorageUnavailable(format!("Cannot access {}: {}", path.display(), err))
}
