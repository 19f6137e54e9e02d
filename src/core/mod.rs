pub mod deploy;
pub mod error;
pub mod types;

pub use deploy::{DeployEvent, apply_deploy, apply_deploy_at, initialize, initialize_at};
pub use error::{Result, StoreError, StoreErrorKind, VersionError};
pub use types::{DATE_FORMAT, Deploy, DeployDate, Rollback, ServiceName, ServiceState};
