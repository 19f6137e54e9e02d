use super::locks::ServiceLocks;
use super::query::ServiceQuery;
use crate::core::{
    Deploy, DeployEvent, Result, Rollback, ServiceName, ServiceState, VersionError, apply_deploy,
    initialize,
};
use crate::storage::RecordStore;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Version tracking over an injected record store.
///
/// Reads and writes for one service are serialised through [`ServiceLocks`];
/// different services never block each other.
pub struct VersionService {
    store: Arc<dyn RecordStore>,
    locks: ServiceLocks,
}

impl VersionService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            locks: ServiceLocks::new(),
        }
    }

    pub fn get_state(&self, service: &ServiceName) -> Result<ServiceState> {
        self.locks.with_shared(service, || {
            ServiceQuery::new(self.store.as_ref()).state(service)
        })
    }

    pub fn get_current(&self, service: &ServiceName) -> Result<Deploy> {
        self.locks.with_shared(service, || {
            ServiceQuery::new(self.store.as_ref()).current(service)
        })
    }

    pub fn get_rollback(&self, service: &ServiceName) -> Result<Rollback> {
        self.locks.with_shared(service, || {
            ServiceQuery::new(self.store.as_ref()).rollback(service)
        })
    }

    /// Number of services with a lock currently held or awaited.
    pub fn locks_in_use(&self) -> Result<usize> {
        self.locks.tracked()
    }

    pub fn is_tracked(&self, service: &ServiceName) -> bool {
        self.store.exists(service)
    }

    pub fn record_deploy(&self, service: &ServiceName, version: &str) -> Result<ServiceState> {
        self.record(service, version, DeployEvent::Deploy)
    }

    pub fn record_restart(&self, service: &ServiceName, version: &str) -> Result<ServiceState> {
        self.record(service, version, DeployEvent::Restart)
    }

    /// Loads, transitions and saves one service under its exclusive lock.
    ///
    /// The first write for a service always records a plain deploy, even when
    /// `event` is a restart.
    pub fn record(
        &self,
        service: &ServiceName,
        version: &str,
        event: DeployEvent,
    ) -> Result<ServiceState> {
        if version.is_empty() {
            return Err(VersionError::Invalid(format!(
                "version for service '{service}' must not be empty"
            )));
        }

        self.locks
            .with_exclusive(service, || self.transition(service, version, event))
    }

    fn transition(
        &self,
        service: &ServiceName,
        version: &str,
        event: DeployEvent,
    ) -> Result<ServiceState> {
        let (next, first_deploy) = match self.store.load(service)? {
            Some(existing) => (apply_deploy(&existing, version, event.is_restart()), false),
            None => {
                if event.is_restart() {
                    debug!(service = %service, version, "restart on untracked service recorded as first deploy");
                }
                (initialize(version), true)
            }
        };

        if let Err(err) = self.store.save(service, &next) {
            if first_deploy {
                error!(service = %service, version, error = %err, "failed to create service records");
            } else {
                error!(service = %service, version, error = %err, "failed to save service records");
            }
            return Err(err.into());
        }

        info!(
            service = %service,
            version,
            restart = next.current.restart,
            rollback = %next.rollback.version,
            history_len = next.history.len(),
            first_deploy,
            "deploy recorded"
        );
        Ok(next)
    }
}
