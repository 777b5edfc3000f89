//! Abstract contract with the push channel.
//!
//! The wire protocol behind this trait is out of scope; the workflow engine
//! only depends on the channel distinguishing a gone endpoint from any other
//! delivery failure, because gone endpoints are pruned.

use crate::notification::domain::{PushDelivery, PushSubscription};
use async_trait::async_trait;
use thiserror::Error;

/// One-shot delivery contract implemented by the push channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Attempts one delivery to one endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PushTransportError::EndpointGone`] when the channel reports
    /// the endpoint permanently unavailable and
    /// [`PushTransportError::Delivery`] for any other failure.
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        delivery: &PushDelivery,
    ) -> Result<(), PushTransportError>;
}

/// Delivery failures reported by the push channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PushTransportError {
    /// The endpoint no longer exists; its subscription should be pruned.
    #[error("endpoint is gone")]
    EndpointGone,

    /// Any other delivery failure; the endpoint stays registered.
    #[error("delivery failed: {0}")]
    Delivery(String),
}
