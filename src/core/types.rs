use super::{Result, VersionError};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `MM-DD-YYYY:HH:MM:SS`, zero padded, 24 hour clock.
pub const DATE_FORMAT: &str = "%m-%d-%Y:%H:%M:%S";

/// Timestamp of a recorded deploy.
///
/// New dates are always rendered with [`DATE_FORMAT`]. Dates read back from
/// storage are kept verbatim, so records written with other separators still
/// load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeployDate(String);

impl DeployDate {
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz>(at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self(at.format(DATE_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeployDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for DeployDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated service name, safe to use as a storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let reason = if raw.is_empty() {
            Some("must not be empty")
        } else if raw.starts_with('.') {
            Some("must not start with '.'")
        } else if raw.contains(['/', '\\', '\0']) {
            Some("must not contain path separators or NUL")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(VersionError::Invalid(format!(
                "service name '{}' {}",
                raw.escape_debug(),
                reason
            ))),
            None => Ok(Self(raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One recorded release event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deploy {
    pub date: DeployDate,
    pub version: String,
    pub restart: bool,
}

impl Deploy {
    pub fn new(version: impl Into<String>, date: DeployDate, restart: bool) -> Self {
        Self {
            date,
            version: version.into(),
            restart,
        }
    }
}

/// Version to fall back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollback {
    pub version: String,
}

impl Rollback {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

/// Everything recorded for one service. `history` is newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    pub current: Deploy,
    pub rollback: Rollback,
    pub history: Vec<Deploy>,
}
