// Sentinel Web Backend
// Axum server for the live security-telemetry dashboard

pub mod config;
pub mod database;
pub mod error_handling;
pub mod handlers;
pub mod models;
pub mod routes;

pub use config::WebConfig;
pub use database::Database;
pub use error_handling::{AppError, AppResult};

use std::sync::Arc;

use axum::Router;
use sentinel_core::{AlertStore, ConnectionRegistry};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: WebConfig,
    pub registry: Arc<ConnectionRegistry>,
    pub store: AlertStore,
}

impl AppState {
    /// Build the shared state: database bootstrap, schema, alert store, and
    /// an empty connection registry. Background tasks are spawned separately
    /// so tests can exercise the routes without them.
    pub async fn new(config: WebConfig) -> anyhow::Result<Self> {
        let db = Database::new(&config.database_url).await?;
        db.migrate().await?;

        let store = AlertStore::new(db.pool().clone());
        store.init_schema().await?;

        let registry = Arc::new(ConnectionRegistry::new());

        Ok(Self {
            db,
            config,
            registry,
            store,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    routes::app_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
