pub mod engine;
pub mod file;
pub mod memory;

pub use engine::{RecordKind, RecordStore, StoreResult};
pub use file::{DurabilityMode, FileRecordStore};
pub use memory::MemoryRecordStore;
