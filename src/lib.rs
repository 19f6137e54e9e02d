// ============================================================================
// service-versions Library
// ============================================================================

//! Deployment version history for named services.
//!
//! Each service has a *current* deploy, a *rollback* target and a newest-first
//! *history*. Writes go through [`VersionService`], which loads the records,
//! applies the pure transitions in [`core::deploy`] and saves them back under a
//! per-service lock.
//!
//! ```
//! use service_versions::{MemoryRecordStore, ServiceName, VersionService};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let versions = VersionService::new(Arc::new(MemoryRecordStore::new()));
//! let api = ServiceName::parse("api")?;
//!
//! versions.record_deploy(&api, "1.0.0")?;
//! versions.record_deploy(&api, "1.1.0")?;
//! let state = versions.record_restart(&api, "1.1.0")?;
//!
//! assert_eq!(state.current.version, "1.1.0");
//! assert_eq!(state.rollback.version, "1.0.0");
//! assert_eq!(state.history.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod facade;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use config::AppConfig;
pub use core::{
    DATE_FORMAT, Deploy, DeployDate, DeployEvent, Result, Rollback, ServiceName, ServiceState,
    StoreError, StoreErrorKind, VersionError,
};
pub use facade::{ServiceQuery, VersionService};
pub use storage::{DurabilityMode, FileRecordStore, MemoryRecordStore, RecordKind, RecordStore};
pub use web::{ErrorResponse, Server, StatusPolicy};
