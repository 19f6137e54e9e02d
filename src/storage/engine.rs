use crate::core::{ServiceName, ServiceState, StoreError};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The three records kept per service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Current,
    Rollback,
    History,
}

impl RecordKind {
    /// Publication order for a save: `current` goes last so it never runs
    /// ahead of `history`.
    pub const WRITE_ORDER: [RecordKind; 3] =
        [RecordKind::History, RecordKind::Rollback, RecordKind::Current];

    pub fn key(self) -> &'static str {
        match self {
            RecordKind::Current => "current",
            RecordKind::Rollback => "rollback",
            RecordKind::History => "history",
        }
    }
}

/// Record store trait - allows pluggable storage backends
pub trait RecordStore: Send + Sync {
    /// Load all records of a service; `None` when no save ever completed
    fn load(&self, service: &ServiceName) -> StoreResult<Option<ServiceState>>;

    /// Check if a completed save exists for a service
    fn exists(&self, service: &ServiceName) -> bool;

    /// Persist current, rollback and history of a service
    fn save(&self, service: &ServiceName, state: &ServiceState) -> StoreResult<()>;
}
