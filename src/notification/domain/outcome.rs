//! Per-endpoint fan-out outcomes.

use serde::{Deserialize, Serialize};

/// What happened to one endpoint during a fan-out.
///
/// Callers must handle all three cases; partial failure is an expected state
/// of a healthy fan-out, never a whole-operation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EndpointOutcome {
    /// The channel accepted the delivery.
    Delivered {
        /// Endpoint URL the delivery went to.
        endpoint: String,
    },
    /// The channel reported the endpoint gone; its subscription was deleted.
    Pruned {
        /// Endpoint URL that was removed.
        endpoint: String,
    },
    /// Delivery failed; other endpoints are unaffected.
    Failed {
        /// Endpoint URL that failed.
        endpoint: String,
        /// Channel-reported failure reason.
        reason: String,
    },
}

impl EndpointOutcome {
    /// Returns the endpoint URL this outcome concerns.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Delivered { endpoint }
            | Self::Pruned { endpoint }
            | Self::Failed { endpoint, .. } => endpoint,
        }
    }
}

/// Heterogeneous result of one fan-out across a user's endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchReport {
    outcomes: Vec<EndpointOutcome>,
}

impl DispatchReport {
    /// Builds a report from per-endpoint outcomes.
    #[must_use]
    pub const fn new(outcomes: Vec<EndpointOutcome>) -> Self {
        Self { outcomes }
    }

    /// The successful no-op report for a user with zero endpoints.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    /// Returns the per-endpoint outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[EndpointOutcome] {
        &self.outcomes
    }

    /// Number of accepted deliveries.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, EndpointOutcome::Delivered { .. }))
            .count()
    }

    /// Number of endpoints pruned as gone.
    #[must_use]
    pub fn pruned(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, EndpointOutcome::Pruned { .. }))
            .count()
    }

    /// Number of failed deliveries.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, EndpointOutcome::Failed { .. }))
            .count()
    }
}
