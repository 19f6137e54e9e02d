use super::usage::USAGE;
use super::{ApiError, ApiResult, StatusPolicy};
use crate::core::{Deploy, DeployEvent, Result, Rollback, ServiceName, ServiceState};
use crate::facade::VersionService;
use axum::Json;
use axum::extract::{Path, State};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VersionService>,
    pub status_policy: StatusPolicy,
}

impl AppState {
    pub fn new(service: Arc<VersionService>, status_policy: StatusPolicy) -> Self {
        Self {
            service,
            status_policy,
        }
    }

    /// Runs `op` for a validated service name on the blocking pool.
    async fn run<T, F>(&self, raw_service: String, op: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&VersionService, &ServiceName) -> Result<T> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let outcome = tokio::task::spawn_blocking(move || {
            let name = ServiceName::parse(raw_service)?;
            op(&service, &name)
        })
        .await
        .map_err(|e| ApiError::internal(format!("request worker failed: {e}")))?;

        outcome.map_err(|err| ApiError::from_version_error(err, self.status_policy))
    }
}

pub async fn usage() -> &'static str {
    USAGE
}

pub async fn get_service(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<Json<ServiceState>> {
    state
        .run(service, |versions, name| versions.get_state(name))
        .await
        .map(Json)
}

pub async fn get_current(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<Json<Deploy>> {
    state
        .run(service, |versions, name| versions.get_current(name))
        .await
        .map(Json)
}

pub async fn get_rollback(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<Json<Rollback>> {
    state
        .run(service, |versions, name| versions.get_rollback(name))
        .await
        .map(Json)
}

pub async fn store_version(
    State(state): State<AppState>,
    Path((service, version)): Path<(String, String)>,
) -> ApiResult<Json<ServiceState>> {
    record(&state, service, version, DeployEvent::Deploy).await
}

/// The trailing segment is a presence flag; its content is discarded.
pub async fn store_version_with_flag(
    State(state): State<AppState>,
    Path((service, version, restart)): Path<(String, String, String)>,
) -> ApiResult<Json<ServiceState>> {
    let event = DeployEvent::from_flag(!restart.is_empty());
    record(&state, service, version, event).await
}

async fn record(
    state: &AppState,
    service: String,
    version: String,
    event: DeployEvent,
) -> ApiResult<Json<ServiceState>> {
    state
        .run(service, move |versions, name| versions.record(name, &version, event))
        .await
        .map(Json)
}
