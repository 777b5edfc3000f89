//! Boundary error taxonomy and status mapping.

use crate::notification::services::DispatchError;
use crate::task::{
    domain::TaskDomainError,
    services::{CancellationError, CompletionError, ReviewError, SweepError},
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Operation failure as reported across the boundary.
///
/// Persistence causes are retained as sources for server-side logging; the
/// caller-facing message for [`Self::Store`] stays generic.
#[derive(Debug, Clone, Error)]
pub enum BoundaryError {
    /// Missing or invalid bearer credential.
    #[error("missing or invalid credentials")]
    Authentication,

    /// Valid credential, but wrong role or tenant.
    #[error("permission denied: {0}")]
    Authorization(String),

    /// Malformed or missing required input.
    #[error("{0}")]
    Validation(String),

    /// The referenced task or assignment does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Geofence violation; carries the measured distance and the limit for
    /// user-facing display.
    #[error("submission is {distance:.0} m from the site, limit {limit:.0} m")]
    OutOfRange {
        /// Measured great-circle distance in meters.
        distance: f64,
        /// Acceptance radius in meters.
        limit: f64,
    },

    /// The operation cannot run with the site's current configuration.
    #[error("{0}")]
    Config(String),

    /// Persistence failure; details stay server-side.
    #[error("internal storage error")]
    Store(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl BoundaryError {
    /// Returns the HTTP-style status code of the reference transport.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Authentication => 401,
            Self::Authorization(_) => 403,
            Self::Validation(_) | Self::OutOfRange { .. } | Self::Config(_) => 400,
            Self::NotFound(_) => 404,
            Self::Store(_) => 500,
        }
    }

    /// Serialisable error body for the reference transport.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

/// Wire shape of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Caller-facing message.
    pub error: String,
}

fn from_domain(err: TaskDomainError) -> BoundaryError {
    match err {
        TaskDomainError::OutOfRange {
            distance_meters,
            limit_meters,
        } => BoundaryError::OutOfRange {
            distance: distance_meters,
            limit: limit_meters,
        },
        TaskDomainError::PdvNotGeolocated(_) => BoundaryError::Config(err.to_string()),
        other => BoundaryError::Validation(other.to_string()),
    }
}

impl From<CompletionError> for BoundaryError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::NotFound(_) => Self::NotFound(err.to_string()),
            CompletionError::TenantMismatch(_) => Self::Authorization(err.to_string()),
            CompletionError::Domain(domain) => from_domain(domain),
            CompletionError::Store(store) => Self::Store(Arc::new(store)),
        }
    }
}

impl From<ReviewError> for BoundaryError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound(_) => Self::NotFound(err.to_string()),
            ReviewError::TenantMismatch(_) | ReviewError::PermissionDenied => {
                Self::Authorization(err.to_string())
            }
            ReviewError::Domain(domain) => from_domain(domain),
            ReviewError::Store(store) => Self::Store(Arc::new(store)),
        }
    }
}

impl From<CancellationError> for BoundaryError {
    fn from(err: CancellationError) -> Self {
        match err {
            CancellationError::NotFound(_) => Self::NotFound(err.to_string()),
            CancellationError::TenantMismatch(_) | CancellationError::PermissionDenied => {
                Self::Authorization(err.to_string())
            }
            CancellationError::Domain(domain) => from_domain(domain),
            CancellationError::Store(store) => Self::Store(Arc::new(store)),
        }
    }
}

impl From<SweepError> for BoundaryError {
    fn from(err: SweepError) -> Self {
        match err {
            SweepError::Store(store) => Self::Store(Arc::new(store)),
        }
    }
}

impl From<DispatchError> for BoundaryError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Store(store) => Self::Store(Arc::new(store)),
        }
    }
}
