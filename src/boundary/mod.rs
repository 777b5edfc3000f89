//! Transport-agnostic operation boundary.
//!
//! Each workflow operation is exposed as a typed request/response pair plus
//! an error taxonomy with an HTTP-style status mapping. A transport adapter
//! (out of scope) deserialises the wire payload, resolves the bearer
//! credential through [`auth::authenticate`], invokes the handler, and
//! serialises the response or the error body with
//! [`error::BoundaryError::status_code`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod requests;
pub mod responses;

pub use auth::{CredentialError, CredentialVerifier, PREFLIGHT_HEADERS, authenticate};
pub use error::BoundaryError;

#[cfg(test)]
mod tests;
