use std::fmt;
use thiserror::Error;

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    IoFailure,
    CorruptRecord,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreErrorKind::IoFailure => f.write_str("I/O failure"),
            StoreErrorKind::CorruptRecord => f.write_str("corrupt record"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O failure at {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record at {location}: {reason}")]
    Corrupt { location: String, reason: String },
}

impl StoreError {
    pub fn io(location: impl fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            location: location.to_string(),
            source,
        }
    }

    pub fn corrupt(location: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            location: location.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io { .. } => StoreErrorKind::IoFailure,
            StoreError::Corrupt { .. } => StoreErrorKind::CorruptRecord,
        }
    }
}

#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Service '{0}' not found")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl VersionError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, VersionError::NotFound(_))
    }

    /// Store error kind, if this error came out of the record store.
    pub fn store_kind(&self) -> Option<StoreErrorKind> {
        match self {
            VersionError::Store(err) => Some(err.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VersionError>;

impl<T> From<std::sync::PoisonError<T>> for VersionError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}
