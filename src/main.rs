//! Event Listing Backend
//!
//! A REST backend for browsing and creating events, backed by a JSON file store.

mod api;
mod config;
mod errors;
mod models;
mod store;
mod uploads;
mod weather;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use store::EventStore;
use uploads::UploadStore;
use weather::WeatherClient;

/// Timeout for calls to the weather provider.
const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);

/// Room left in request bodies for multipart framing and text fields.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore>,
    pub uploads: Arc<UploadStore>,
    pub weather: Arc<WeatherClient>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting Event Listing Backend");
    tracing::info!("Store path: {:?}", config.store_path);
    tracing::info!("Seed path: {:?}", config.seed_path);
    tracing::info!("Uploads directory: {:?}", config.uploads_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize event store
    let store = Arc::new(store::init_store(&config).await?);
    match store.list_all().await {
        Ok(events) => tracing::info!(
            "Event store {:?} loaded with {} events",
            store.store_path(),
            events.len()
        ),
        Err(e) => tracing::warn!("Event store is not readable yet: {}", e),
    }

    // Ensure uploads directory exists
    if let Err(e) = tokio::fs::create_dir_all(&config.uploads_dir).await {
        tracing::warn!("Failed to create uploads directory: {}", e);
    }
    let uploads = Arc::new(UploadStore::new(
        &config.uploads_dir,
        config.max_upload_bytes,
    ));

    let weather = Arc::new(WeatherClient::new(&config.weather_url, WEATHER_TIMEOUT)?);

    // Create application state
    let state = AppState {
        store,
        uploads,
        weather,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    // API routes
    let api_routes = Router::new()
        // Events
        .route("/events", get(api::list_events).post(api::create_event))
        .route("/events/create", post(api::create_event_form))
        .route(
            "/events/{id}",
            get(api::get_event)
                .put(api::update_event)
                .delete(api::delete_event),
        )
        .route("/events/{id}/weather", get(api::get_event_weather))
        // Uploads
        .route("/upload", post(api::upload_image))
        // Weather
        .route("/weather", get(api::get_weather))
        .layer(DefaultBodyLimit::max(body_limit));

    // Health check and uploaded images
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .nest_service("/uploads", ServeDir::new(&state.config.uploads_dir));

    Router::new()
        .nest("/api", api_routes)
        .merge(public_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
