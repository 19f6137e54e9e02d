use super::StatusPolicy;
use super::handlers::{
    AppState, get_current, get_rollback, get_service, store_version, store_version_with_flag,
    usage,
};
use crate::config::AppConfig;
use crate::core::StoreError;
use crate::facade::VersionService;
use crate::storage::{FileRecordStore, MemoryRecordStore, RecordStore};
use axum::Router;
use axum::http::HeaderName;
use axum::routing::{get, post};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn build_router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .route("/", get(usage))
        .route("/services/:service", get(get_service))
        .route("/services/:service/current", get(get_current))
        .route("/services/:service/rollback", get(get_rollback))
        .route(
            "/services/:service/version/:version",
            post(store_version).put(store_version),
        )
        .route(
            "/services/:service/version/:version/:restart",
            post(store_version_with_flag).put(store_version_with_flag),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}

/// The HTTP server, built once at startup around an injected record store.
pub struct Server {
    service: Arc<VersionService>,
    status_policy: StatusPolicy,
}

impl Server {
    pub fn new(store: Arc<dyn RecordStore>, status_policy: StatusPolicy) -> Self {
        Self {
            service: Arc::new(VersionService::new(store)),
            status_policy,
        }
    }

    /// Builds the store described by `config` and wraps it in a server.
    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn RecordStore> = if config.ephemeral {
            info!("using in-memory record store");
            Arc::new(MemoryRecordStore::new())
        } else {
            let store = FileRecordStore::open(&config.data_dir, config.durability)?;
            info!(
                data_dir = %store.root().display(),
                durability = %store.durability(),
                "using file record store"
            );
            Arc::new(store)
        };
        Ok(Self::new(store, config.status_policy))
    }

    pub fn service(&self) -> &Arc<VersionService> {
        &self.service
    }

    pub fn router(&self) -> Router {
        build_router(AppState::new(Arc::clone(&self.service), self.status_policy))
    }

    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
