pub mod locks;
pub mod query;
pub mod service;

pub use locks::ServiceLocks;
pub use query::ServiceQuery;
pub use service::VersionService;
