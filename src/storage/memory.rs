use super::engine::{RecordStore, StoreResult};
use crate::core::{ServiceName, ServiceState};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Record store kept entirely in memory; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    services: RwLock<HashMap<ServiceName, ServiceState>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self, service: &ServiceName) -> StoreResult<Option<ServiceState>> {
        let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
        Ok(services.get(service).cloned())
    }

    fn exists(&self, service: &ServiceName) -> bool {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(service)
    }

    fn save(&self, service: &ServiceName, state: &ServiceState) -> StoreResult<()> {
        let mut services = self.services.write().unwrap_or_else(PoisonError::into_inner);
        services.insert(service.clone(), state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::initialize;

    #[test]
    fn test_memory_store_save_and_load() {
        let store = MemoryRecordStore::new();
        let service = ServiceName::parse("search").unwrap();
        assert!(store.is_empty());
        assert!(store.load(&service).unwrap().is_none());

        let state = initialize("0.9.0");
        store.save(&service, &state).unwrap();

        assert!(store.exists(&service));
        assert_eq!(store.len(), 1);
        assert_eq!(store.load(&service).unwrap(), Some(state));
    }
}
