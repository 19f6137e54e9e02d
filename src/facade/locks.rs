use crate::core::{Result, ServiceName};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// One reader/writer lock per service name.
///
/// Writers hold the exclusive side across load, transition and save; readers
/// hold the shared side so they never see a half-published record set.
/// An entry lives only while some caller holds or waits on it.
#[derive(Debug, Default)]
pub struct ServiceLocks {
    locks: Mutex<HashMap<ServiceName, Arc<RwLock<()>>>>,
}

impl ServiceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `op` while holding the shared side of the service's lock.
    pub fn with_shared<T>(
        &self,
        service: &ServiceName,
        op: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let lock = self.lock_for(service)?;
        let outcome = match lock.read() {
            Ok(_guard) => op(),
            Err(err) => Err(err.into()),
        };
        self.release(service, lock)?;
        outcome
    }

    /// Runs `op` while holding the exclusive side of the service's lock.
    pub fn with_exclusive<T>(
        &self,
        service: &ServiceName,
        op: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let lock = self.lock_for(service)?;
        let outcome = match lock.write() {
            Ok(_guard) => op(),
            Err(err) => Err(err.into()),
        };
        self.release(service, lock)?;
        outcome
    }

    pub fn tracked(&self) -> Result<usize> {
        Ok(self.locks.lock()?.len())
    }

    fn lock_for(&self, service: &ServiceName) -> Result<Arc<RwLock<()>>> {
        let mut locks = self.locks.lock()?;
        Ok(Arc::clone(locks.entry(service.clone()).or_default()))
    }

    // Clones are only handed out under the registry mutex, so a count of one
    // seen while holding it means nobody else can still reach the entry.
    fn release(&self, service: &ServiceName, lock: Arc<RwLock<()>>) -> Result<()> {
        let mut locks = self.locks.lock()?;
        drop(lock);
        if locks
            .get(service)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(service);
        }
        Ok(())
    }
}
