//! HTTP transport.
//!
//! Thin axum layer over [`VersionService`](crate::facade::VersionService):
//! path extraction, blocking-pool dispatch and error body mapping.

pub mod handlers;
pub mod server;
pub mod usage;

use crate::core::VersionError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

pub use handlers::AppState;
pub use server::{Server, build_router};
pub use usage::USAGE;

/// How service errors are mapped onto HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Every failure is a 500.
    #[default]
    Legacy,
    /// Missing services are 404, rejected input is 400, the rest 500.
    Precise,
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(StatusPolicy::Legacy),
            "precise" => Ok(StatusPolicy::Precise),
            other => Err(format!("unknown status policy '{other}' (expected legacy or precise)")),
        }
    }
}

impl fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusPolicy::Legacy => f.write_str("legacy"),
            StatusPolicy::Precise => f.write_str("precise"),
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn from_version_error(err: VersionError, policy: StatusPolicy) -> Self {
        let status = match (policy, &err) {
            (StatusPolicy::Precise, VersionError::NotFound(_)) => StatusCode::NOT_FOUND,
            (StatusPolicy::Precise, VersionError::Invalid(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &err {
            VersionError::NotFound(_) | VersionError::Invalid(_) => {
                debug!(error = %err, status = status.as_u16(), "request rejected")
            }
            VersionError::Store(_) | VersionError::Lock(_) => {
                warn!(error = %err, status = status.as_u16(), "request failed")
            }
        }

        Self {
            status,
            message: err.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            status: self
                .status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            error: self.message,
        });

        (self.status, body).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
