use crate::core::{Deploy, Result, Rollback, ServiceName, ServiceState, VersionError};
use crate::storage::RecordStore;

/// Read-only projections over a record store.
///
/// Absent services fail with [`VersionError::NotFound`]; store failures are
/// passed through as [`VersionError::Store`].
pub struct ServiceQuery<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> ServiceQuery<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    pub fn state(&self, service: &ServiceName) -> Result<ServiceState> {
        self.store
            .load(service)?
            .ok_or_else(|| VersionError::NotFound(service.to_string()))
    }

    pub fn current(&self, service: &ServiceName) -> Result<Deploy> {
        self.state(service).map(|state| state.current)
    }

    pub fn rollback(&self, service: &ServiceName) -> Result<Rollback> {
        self.state(service).map(|state| state.rollback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DeployDate, StoreError, StoreErrorKind, apply_deploy_at, initialize_at};
    use crate::storage::{MemoryRecordStore, StoreResult};

    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn load(&self, service: &ServiceName) -> StoreResult<Option<ServiceState>> {
            Err(StoreError::io(
                service,
                std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged"),
            ))
        }

        fn exists(&self, _service: &ServiceName) -> bool {
            false
        }

        fn save(&self, service: &ServiceName, _state: &ServiceState) -> StoreResult<()> {
            Err(StoreError::io(
                service,
                std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged"),
            ))
        }
    }

    fn seeded() -> (MemoryRecordStore, ServiceName, ServiceState) {
        let store = MemoryRecordStore::new();
        let service = ServiceName::parse("checkout").unwrap();
        let first = initialize_at("2.0.0", DeployDate::from("03-01-2024:09:00:00"));
        let state = apply_deploy_at(&first, "2.1.0", false, DeployDate::from("03-02-2024:09:00:00"));
        store.save(&service, &state).unwrap();
        (store, service, state)
    }

    #[test]
    fn test_projections() {
        let (store, service, state) = seeded();
        let query = ServiceQuery::new(&store);

        assert_eq!(query.state(&service).unwrap(), state);
        assert_eq!(query.current(&service).unwrap().version, "2.1.0");
        assert_eq!(query.rollback(&service).unwrap().version, "2.0.0");
    }

    #[test]
    fn test_reads_are_idempotent() {
        let (store, service, _) = seeded();
        let query = ServiceQuery::new(&store);
        assert_eq!(query.state(&service).unwrap(), query.state(&service).unwrap());
    }

    #[test]
    fn test_absent_service_is_not_found() {
        let store = MemoryRecordStore::new();
        let query = ServiceQuery::new(&store);
        let service = ServiceName::parse("nonexistent").unwrap();

        assert!(query.state(&service).unwrap_err().is_not_found());
        assert!(query.current(&service).unwrap_err().is_not_found());
        assert!(query.rollback(&service).unwrap_err().is_not_found());
    }

    #[test]
    fn test_store_errors_pass_through() {
        let query = ServiceQuery::new(&BrokenStore);
        let service = ServiceName::parse("checkout").unwrap();

        let err = query.current(&service).unwrap_err();
        assert_eq!(err.store_kind(), Some(StoreErrorKind::IoFailure));
    }
}
