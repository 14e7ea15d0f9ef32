//! File-backed event store.
//!
//! The JSON file on disk is the source of truth for all events.

mod events;
mod storage;

pub use events::*;
pub use storage::*;

use crate::config::Config;
use crate::errors::AppError;

/// Open the event store described by `config` and make sure it is initialized.
pub async fn init_store(config: &Config) -> Result<EventStore, AppError> {
    let store = EventStore::new(
        FsStorage,
        config.store_path.clone(),
        Some(config.seed_path.clone()),
    );
    store.initialize().await?;
    Ok(store)
}
