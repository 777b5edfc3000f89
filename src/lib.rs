//! Vigia: field-compliance task workflow engine.
//!
//! This crate implements the lifecycle of recurring inspection tasks executed
//! at physical points of sale: GPS-validated completion with deadline
//! classification, post-completion audit review, administrative cancellation,
//! batch closure of missed tasks, and the push-notification fan-out triggered
//! by audit decisions.
//!
//! # Architecture
//!
//! Vigia follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, push channel)
//!
//! # Modules
//!
//! - [`task`]: task-instance lifecycle — completion, review, cancellation,
//!   and the missed-task sweep
//! - [`notification`]: push-subscription fan-out and the internal inbox
//! - [`access`]: caller identity, tenancy, and role authorisation
//! - [`boundary`]: transport-agnostic operation contracts and error mapping

pub mod access;
pub mod boundary;
pub mod notification;
pub mod task;
