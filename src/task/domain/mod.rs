//! Domain model for task-instance lifecycle management.
//!
//! The task domain models the completion state machine, the audit review
//! sub-state, geofence and deadline evaluation, and the read-only routine and
//! point-of-sale context consulted at completion time, while keeping all
//! infrastructure concerns outside of the domain boundary.

mod deadline;
mod error;
mod geo;
mod ids;
mod instance;
mod rules;
mod state;

pub use deadline::{CivilOffset, DeadlineVerdict, END_OF_DAY, deadline_instant, evaluate};
pub use error::{
    ParseAuditStatusError, ParsePriorityError, ParseTaskStateError, TaskDomainError,
};
pub use geo::{Coordinates, DEFAULT_PDV_RADIUS_METERS, GpsResult, distance_meters, within_radius};
pub use ids::{AssignmentId, PdvId, ProductId, RoutineId, TaskInstanceId};
pub use instance::{
    Cancellation, PersistedTaskInstance, Priority, ReviewRecord, TaskInstance,
};
pub use rules::{InventoryLine, Pdv, RoutineRules};
pub use state::{AuditStatus, ReviewDecision, TaskState};
