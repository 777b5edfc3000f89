//! Bearer-credential authentication at the boundary.

use super::error::BoundaryError;
use crate::access::AuthContext;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Cross-origin headers acknowledged on a same-origin pre-flight request.
/// The pre-flight response carries these headers and no body.
pub const PREFLIGHT_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "authorization, content-type"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
];

/// Resolves a bearer token to a caller identity.
///
/// Implemented by the deployment's identity provider adapter; tests use a
/// fixed-table fake.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verifies a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Invalid`] for unknown or expired tokens and
    /// [`CredentialError::Unavailable`] when the provider cannot be reached.
    async fn verify(&self, token: &str) -> Result<AuthContext, CredentialError>;
}

/// Credential resolution failures.
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    /// The token is unknown, malformed, or expired.
    #[error("invalid credentials")]
    Invalid,

    /// The identity provider could not be reached.
    #[error("credential verification unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

/// Authenticates an `Authorization` header value.
///
/// # Errors
///
/// Returns [`BoundaryError::Authentication`] when the header is absent, not
/// a bearer scheme, or carries an invalid token, and [`BoundaryError::Store`]
/// when the identity provider is unavailable.
pub async fn authenticate<V>(
    verifier: &V,
    authorization: Option<&str>,
) -> Result<AuthContext, BoundaryError>
where
    V: CredentialVerifier,
{
    let header = authorization.ok_or(BoundaryError::Authentication)?;
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(BoundaryError::Authentication)?;

    verifier.verify(token).await.map_err(|err| match err {
        CredentialError::Invalid => BoundaryError::Authentication,
        CredentialError::Unavailable(cause) => BoundaryError::Store(cause),
    })
}
