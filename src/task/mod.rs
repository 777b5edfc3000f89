//! Task-instance lifecycle management for Vigia.
//!
//! This module implements the workflow core: GPS-validated task completion
//! with deadline classification, post-completion audit review, administrative
//! cancellation, and the set-based sweep that closes overdue pending tasks.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod tests;
